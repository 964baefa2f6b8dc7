//! Execution provider parsing and listing

use crate::{
    config::{BackendType, ExecutionProvider},
    error::{BgRemovalError, Result},
};

/// Information about an execution provider
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub name: String,
    pub backend_type: BackendType,
    pub execution_provider: ExecutionProvider,
    pub available: bool,
    pub description: String,
}

/// Utility for parsing and managing execution providers
pub struct ExecutionProviderManager;

impl ExecutionProviderManager {
    /// Parse execution provider string in format "backend:provider"
    ///
    /// A bare backend name selects that backend's default provider.
    ///
    /// # Errors
    /// - Unknown backend or provider name
    ///
    /// # Examples
    /// ```rust
    /// use bgremover::utils::ExecutionProviderManager;
    /// use bgremover::{BackendType, ExecutionProvider};
    ///
    /// let (backend, provider) = ExecutionProviderManager::parse_provider_string("tract:cpu")?;
    /// assert_eq!(backend, BackendType::Tract);
    /// assert_eq!(provider, ExecutionProvider::Cpu);
    /// # Ok::<(), bgremover::BgRemovalError>(())
    /// ```
    pub fn parse_provider_string(provider_str: &str) -> Result<(BackendType, ExecutionProvider)> {
        let Some((backend, provider)) = provider_str.split_once(':') else {
            return match provider_str {
                "onnx" => Ok((BackendType::Onnx, ExecutionProvider::Auto)),
                "tract" => Ok((BackendType::Tract, ExecutionProvider::Cpu)),
                _ => Err(BgRemovalError::invalid_config(format!(
                    "Invalid provider '{provider_str}'. Use backend:provider (e.g., onnx:auto, tract:cpu)"
                ))),
            };
        };

        match backend {
            "onnx" => {
                let execution_provider = match provider {
                    "auto" => ExecutionProvider::Auto,
                    "cpu" => ExecutionProvider::Cpu,
                    "cuda" => ExecutionProvider::Cuda,
                    "coreml" => ExecutionProvider::CoreMl,
                    _ => {
                        return Err(BgRemovalError::invalid_config(format!(
                            "Unknown ONNX provider: {provider}. Supported: auto, cpu, cuda, coreml"
                        )));
                    },
                };
                Ok((BackendType::Onnx, execution_provider))
            },
            "tract" => match provider {
                "cpu" => Ok((BackendType::Tract, ExecutionProvider::Cpu)),
                _ => Err(BgRemovalError::invalid_config(format!(
                    "Unknown Tract provider: {provider}. Tract only supports 'cpu'"
                ))),
            },
            _ => Err(BgRemovalError::invalid_config(format!(
                "Unknown backend: {backend}. Supported backends: onnx, tract"
            ))),
        }
    }

    /// Convert backend type and execution provider back to string
    #[must_use]
    pub fn provider_to_string(backend_type: BackendType, provider: ExecutionProvider) -> String {
        format!("{backend_type}:{provider}")
    }

    /// All provider combinations with their availability in this build
    #[must_use]
    pub fn list_all_providers() -> Vec<ProviderInfo> {
        let mut providers = Vec::new();

        #[cfg(feature = "onnx")]
        let onnx_availability: std::collections::HashMap<String, bool> =
            crate::backends::OnnxBackend::list_providers()
                .into_iter()
                .map(|(name, available, _)| (name.to_lowercase(), available))
                .collect();

        for (provider, description) in [
            (ExecutionProvider::Auto, "ONNX Runtime with auto-selected provider"),
            (ExecutionProvider::Cpu, "ONNX Runtime CPU execution"),
            (ExecutionProvider::Cuda, "ONNX Runtime CUDA GPU acceleration"),
            (
                ExecutionProvider::CoreMl,
                "ONNX Runtime CoreML (Apple Silicon) acceleration",
            ),
        ] {
            #[cfg(feature = "onnx")]
            let available = match provider {
                // CPU is always a fallback for auto
                ExecutionProvider::Auto => true,
                other => onnx_availability
                    .get(&other.to_string())
                    .copied()
                    .unwrap_or(false),
            };
            #[cfg(not(feature = "onnx"))]
            let available = false;

            providers.push(ProviderInfo {
                name: Self::provider_to_string(BackendType::Onnx, provider),
                backend_type: BackendType::Onnx,
                execution_provider: provider,
                available,
                description: description.to_string(),
            });
        }

        #[cfg(feature = "tract")]
        for (name, available, description) in crate::backends::TractBackend::list_providers() {
            providers.push(ProviderInfo {
                name: format!("tract:{}", name.to_lowercase()),
                backend_type: BackendType::Tract,
                execution_provider: ExecutionProvider::Cpu,
                available,
                description,
            });
        }

        #[cfg(not(feature = "tract"))]
        providers.push(ProviderInfo {
            name: "tract:cpu".to_string(),
            backend_type: BackendType::Tract,
            execution_provider: ExecutionProvider::Cpu,
            available: false,
            description: "Pure Rust CPU inference via Tract (feature disabled)".to_string(),
        });

        providers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_onnx_providers() {
        for (input, expected) in [
            ("onnx:auto", ExecutionProvider::Auto),
            ("onnx:cpu", ExecutionProvider::Cpu),
            ("onnx:cuda", ExecutionProvider::Cuda),
            ("onnx:coreml", ExecutionProvider::CoreMl),
        ] {
            let (backend, provider) =
                ExecutionProviderManager::parse_provider_string(input).unwrap();
            assert_eq!(backend, BackendType::Onnx);
            assert_eq!(provider, expected);
        }
    }

    #[test]
    fn test_parse_tract_providers() {
        let (backend, provider) =
            ExecutionProviderManager::parse_provider_string("tract:cpu").unwrap();
        assert_eq!(backend, BackendType::Tract);
        assert_eq!(provider, ExecutionProvider::Cpu);

        // Tract doesn't support other providers
        assert!(ExecutionProviderManager::parse_provider_string("tract:cuda").is_err());
        assert!(ExecutionProviderManager::parse_provider_string("tract:auto").is_err());
    }

    #[test]
    fn test_parse_backend_only() {
        let (backend, provider) = ExecutionProviderManager::parse_provider_string("onnx").unwrap();
        assert_eq!(backend, BackendType::Onnx);
        assert_eq!(provider, ExecutionProvider::Auto);

        let (backend, provider) = ExecutionProviderManager::parse_provider_string("tract").unwrap();
        assert_eq!(backend, BackendType::Tract);
        assert_eq!(provider, ExecutionProvider::Cpu);
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["invalid", "onnx:invalid", "invalid:auto", "", "onnx:"] {
            let err = ExecutionProviderManager::parse_provider_string(input).unwrap_err();
            assert!(matches!(err, BgRemovalError::InvalidConfig(_)), "{input}");
        }
    }

    #[test]
    fn test_provider_to_string() {
        assert_eq!(
            ExecutionProviderManager::provider_to_string(BackendType::Onnx, ExecutionProvider::Auto),
            "onnx:auto"
        );
        assert_eq!(
            ExecutionProviderManager::provider_to_string(BackendType::Tract, ExecutionProvider::Cpu),
            "tract:cpu"
        );
    }

    #[test]
    fn test_list_all_providers() {
        let providers = ExecutionProviderManager::list_all_providers();
        let names: Vec<&str> = providers.iter().map(|p| p.name.as_str()).collect();
        assert!(names.contains(&"onnx:auto"));
        assert!(names.contains(&"onnx:coreml"));
        assert!(names.contains(&"tract:cpu"));
    }
}
