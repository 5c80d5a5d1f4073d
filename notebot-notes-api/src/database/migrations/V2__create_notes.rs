/// Create the notes table, owned by users
pub fn migration() -> String {
    r#"
CREATE TABLE notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL DEFAULT '',
    note TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    owner_id INTEGER NOT NULL,
    FOREIGN KEY (owner_id) REFERENCES users (id) ON DELETE CASCADE
);

CREATE INDEX idx_notes_owner_created
    ON notes(owner_id, created_at DESC);
"#
    .to_string()
}
