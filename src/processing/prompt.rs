//! Prompt template with a single chunk slot.

use crate::config::ConfigError;

/// Placeholder replaced by the chunk text.
pub const CHUNK_SLOT: &str = "{chunk}";

const DEFAULT_TEMPLATE: &str = "Você é um assistente virtual especializado em análise de documentos.
O usuário forneceu um arquivo PDF e deseja um resumo conciso e uma explicação em tópicos.
Primeiro, forneça um resumo geral do documento.
Depois, explique os pontos principais em tópicos. Responda em markdown.

**Resumo:**
{chunk}

**Explicação em Tópicos:**
- ";

/// Template rendered once per chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Accept a template containing exactly one [`CHUNK_SLOT`].
    pub fn new(template: impl Into<String>) -> Result<Self, ConfigError> {
        let template = template.into();
        match template.matches(CHUNK_SLOT).count() {
            1 => Ok(Self { template }),
            0 => Err(ConfigError::InvalidPromptTemplate(format!(
                "missing {CHUNK_SLOT} slot"
            ))),
            count => Err(ConfigError::InvalidPromptTemplate(format!(
                "expected one {CHUNK_SLOT} slot, found {count}"
            ))),
        }
    }

    /// Substitute `chunk` into the slot. The chunk itself is never re-scanned for slots.
    pub fn render(&self, chunk: &str) -> String {
        self.template.replacen(CHUNK_SLOT, chunk, 1)
    }

    /// Raw template text.
    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}
