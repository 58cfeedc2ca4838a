use crate::prompts::conversation_instruction;

/// The system instruction for one connection. Overwritten, never appended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionContext {
    instruction: String,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::with_topic("")
    }
}

impl SessionContext {
    pub fn with_topic(topic: &str) -> Self {
        Self { instruction: conversation_instruction(topic) }
    }

    pub fn set_topic(&mut self, topic: &str) {
        self.instruction = conversation_instruction(topic);
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }
}
