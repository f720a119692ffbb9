use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::StatusCode;
use serde_json::json;

use super::SynthesisBackend;
use crate::config_loader;
use crate::error::SynthesisError;

/// HTTP adapter for the ElevenLabs text-to-speech endpoint. Voice, model and
/// output format are fixed at construction; the API key travels per request.
pub struct ElevenLabsBackend {
    client: reqwest::Client,
    base_url: String,
    voice_id: String,
    model_id: String,
    output_format: String,
}

impl ElevenLabsBackend {
    /// Backend wired up from the global settings.
    pub fn new() -> Self {
        let (base_url, voice_id, model_id, output_format) = match config_loader::SETTINGS.read() {
            Ok(s) => (
                s.api_base_url.clone(),
                s.voice_id.clone(),
                s.model_id.clone(),
                s.output_format.clone(),
            ),
            Err(_) => {
                let defaults = config_loader::Settings::default();
                (
                    defaults.api_base_url,
                    defaults.voice_id,
                    defaults.model_id,
                    defaults.output_format,
                )
            }
        };
        Self::with_params(base_url, voice_id, model_id, output_format)
    }

    /// Explicit parameters. Tests point `base_url` at a local mock server.
    pub fn with_params(
        base_url: String,
        voice_id: String,
        model_id: String,
        output_format: String,
    ) -> Self {
        // No request timeout: a generation takes as long as the provider
        // needs, and there is no way to cancel one once started.
        let client = reqwest::Client::new();
        Self {
            client,
            base_url,
            voice_id,
            model_id,
            output_format,
        }
    }
}

#[async_trait]
impl SynthesisBackend for ElevenLabsBackend {
    fn id(&self) -> &'static str {
        "elevenlabs"
    }

    async fn synthesize(&self, text: &str, api_key: &str) -> Result<Vec<u8>, SynthesisError> {
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyInput);
        }

        let url = format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id);
        let response = self
            .client
            .post(&url)
            .query(&[("output_format", self.output_format.as_str())])
            .header("xi-api-key", api_key)
            .json(&json!({
                "text": text,
                "model_id": self.model_id,
            }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Auth(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Provider(format!("{}: {}", status, body)));
        }

        // Accumulate the whole body before anyone sees it. Chunks arrive in
        // order, so the buffer is exactly the provider's response.
        let mut audio = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            audio.extend_from_slice(&chunk?);
        }
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn backend_for(server: &mockito::ServerGuard) -> ElevenLabsBackend {
        ElevenLabsBackend::with_params(
            server.url(),
            "voice123".to_string(),
            "model_x".to_string(),
            "mp3_44100_128".to_string(),
        )
    }

    #[test]
    fn test_success_returns_the_full_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/text-to-speech/voice123")
            .match_query(Matcher::UrlEncoded(
                "output_format".into(),
                "mp3_44100_128".into(),
            ))
            .match_header("xi-api-key", "sk-test")
            .match_body(Matcher::Json(json!({
                "text": "bonjour",
                "model_id": "model_x",
            })))
            .with_status(200)
            .with_body(b"ID3\x04fake-mpeg-frames".as_ref())
            .create();

        let backend = backend_for(&server);
        let audio = tokio_test::block_on(backend.synthesize("bonjour", "sk-test")).unwrap();

        assert_eq!(audio, b"ID3\x04fake-mpeg-frames");
        mock.assert();
    }

    #[test]
    fn test_unauthorized_maps_to_auth_error() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/v1/text-to-speech/voice123")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("invalid api key")
            .create();

        let backend = backend_for(&server);
        let err = tokio_test::block_on(backend.synthesize("hello", "sk-bad")).unwrap_err();

        match err {
            SynthesisError::Auth(message) => assert!(message.contains("invalid api key")),
            other => panic!("expected Auth, got {:?}", other),
        }
    }

    #[test]
    fn test_server_failure_maps_to_provider_error() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/v1/text-to-speech/voice123")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("quota exceeded")
            .create();

        let backend = backend_for(&server);
        let err = tokio_test::block_on(backend.synthesize("hello", "sk-test")).unwrap_err();

        match err {
            SynthesisError::Provider(message) => assert!(message.contains("quota exceeded")),
            other => panic!("expected Provider, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_text_never_hits_the_network() {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", Matcher::Any).expect(0).create();

        let backend = backend_for(&server);
        let err = tokio_test::block_on(backend.synthesize("   ", "sk-test")).unwrap_err();

        assert!(matches!(err, SynthesisError::EmptyInput));
        mock.assert();
    }
}
