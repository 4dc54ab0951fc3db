//! UUID generation and JWT inspection.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use canivete_core::contract::{JwtDebuggerOutput, UuidOutput};
use canivete_core::{ProgrammingService, ServiceError, ServiceResult};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Generates v4 UUIDs and decodes JWTs without verifying them.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardProgrammingService;

impl StandardProgrammingService {
    /// Creates the service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgrammingService for StandardProgrammingService {
    async fn new_uuid(&self) -> ServiceResult<UuidOutput> {
        Ok(UuidOutput {
            uuid: Uuid::new_v4().to_string(),
        })
    }

    async fn debug_jwt(&self, token: &str) -> ServiceResult<JwtDebuggerOutput> {
        let segments: Vec<&str> = token.split('.').collect();
        let [header, payload, _signature] = segments.as_slice() else {
            return Err(ServiceError::invalid_input(
                "token contains an invalid number of segments",
            ));
        };

        Ok(JwtDebuggerOutput {
            header: decode_segment(header, "header")?,
            payload: decode_segment(payload, "payload")?,
        })
    }
}

fn decode_segment(segment: &str, part: &str) -> ServiceResult<Map<String, Value>> {
    // padded tokens exist in the wild
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| ServiceError::invalid_input(format!("token {part} is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| ServiceError::invalid_input(format!("token {part} is not a JSON object: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use canivete_core::fixtures::{sample_jwt_output, SAMPLE_JWT};

    #[tokio::test]
    async fn test_new_uuid_is_v4() {
        let output = StandardProgrammingService::new().new_uuid().await.unwrap();
        let parsed = Uuid::parse_str(&output.uuid).unwrap();

        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(output.uuid, parsed.hyphenated().to_string());
    }

    #[tokio::test]
    async fn test_uuids_differ() {
        let service = StandardProgrammingService::new();
        let first = service.new_uuid().await.unwrap();
        let second = service.new_uuid().await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_decodes_sample_token() {
        let output = StandardProgrammingService::new()
            .debug_jwt(SAMPLE_JWT)
            .await
            .unwrap();

        assert_eq!(output, sample_jwt_output());
    }

    #[tokio::test]
    async fn test_padded_segments_are_accepted() {
        // {"alg":"none"} encodes with one padding character
        let token = "eyJhbGciOiJub25lIn0=.eyJzdWIiOiIxIn0.";
        let output = StandardProgrammingService::new().debug_jwt(token).await.unwrap();

        assert_eq!(output.header["alg"], "none");
        assert_eq!(output.payload["sub"], "1");
    }

    #[tokio::test]
    async fn test_rejects_malformed_tokens() {
        let service = StandardProgrammingService::new();

        let err = service.debug_jwt("").await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::invalid_input("token contains an invalid number of segments")
        );

        let err = service.debug_jwt("a.b").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let err = service.debug_jwt("!!!.e30.sig").await.unwrap_err();
        assert!(err.to_string().starts_with("token header is not base64url"));

        // "WyJ4Il0" is ["x"], valid JSON but not an object
        let err = service.debug_jwt("e30.WyJ4Il0.sig").await.unwrap_err();
        assert!(err.to_string().starts_with("token payload is not a JSON object"));
    }
}
