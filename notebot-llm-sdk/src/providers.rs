pub const OPENAI: &str = "openai";
