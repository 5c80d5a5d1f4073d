/// Every exportable wire type, in the order the generator emits them.
pub const ALL_TYPES: &[&str] = &[
    "UserCreate",
    "UserOut",
    "Token",
    "LoginForm",
    "NoteCreate",
    "NoteOut",
    "NoteResponse",
    "NoteText",
    "TurnRole",
    "Turn",
    "ClientMessage",
    "EventFrame",
    "ErrorResponse",
    "HealthResponse",
];

pub fn generate_typescript_definitions(
    type_names: &[&str],
) -> Result<String, Box<dyn std::error::Error>> {
    if type_names.is_empty() {
        return Err("No type names provided".into());
    }

    let mut definitions = Vec::new();

    for name in type_names {
        let type_def = export_type(name)?;
        let cleaned = clean_type(type_def);

        if !cleaned.trim().is_empty() {
            definitions.push(cleaned);
        }
    }

    Ok(definitions.join("\n\n"))
}

fn export_type(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    use crate::*;
    use ts_rs::TS;

    let result = match name {
        "UserCreate" => UserCreate::export_to_string()?,
        "UserOut" => UserOut::export_to_string()?,
        "Token" => Token::export_to_string()?,
        "LoginForm" => LoginForm::export_to_string()?,

        "NoteCreate" => NoteCreate::export_to_string()?,
        "NoteOut" => NoteOut::export_to_string()?,
        "NoteResponse" => NoteResponse::export_to_string()?,
        "NoteText" => NoteText::export_to_string()?,

        "TurnRole" => TurnRole::export_to_string()?,
        "Turn" => Turn::export_to_string()?,
        "ClientMessage" => ClientMessage::export_to_string()?,
        "EventFrame" => EventFrame::export_to_string()?,

        "ErrorResponse" => ErrorResponse::export_to_string()?,
        "HealthResponse" => HealthResponse::export_to_string()?,

        _ => {
            return Err(format!(
                "Unknown type: '{}'. Available types are listed in typescript_gen::ALL_TYPES",
                name
            )
            .into());
        }
    };

    Ok(result)
}

pub fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    let filtered: Vec<&str> = type_def
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("import type")
                && !trimmed.starts_with("// This file was generated")
        })
        .collect();

    filtered.join("\n").trim().to_string()
}
