/// Create the users table. Emails are unique and passwords are stored as Argon2 hashes.
pub fn migration() -> String {
    r#"
CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL DEFAULT '',
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
"#
    .to_string()
}
