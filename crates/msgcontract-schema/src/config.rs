/// Controls contract validation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum accepted contract text length in bytes.
    pub max_contract_bytes: usize,
    /// Maximum nesting of properties/items walked by the validator.
    ///
    /// Also caps how deep reference substitution may recurse.
    pub max_depth: usize,
    /// Maximum number of nodes reference substitution may expand.
    pub max_expanded_nodes: usize,
    /// When true, message schemas reject properties the contract does not declare.
    pub strict_mode: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_contract_bytes: 1024 * 1024,
            max_depth: 64,
            max_expanded_nodes: 50_000,
            strict_mode: false,
        }
    }
}
