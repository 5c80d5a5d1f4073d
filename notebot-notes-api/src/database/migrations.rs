use refinery::embed_migrations;

embed_migrations!("src/database/migrations");

/// Bring the schema up to date. Already applied migrations are skipped.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), refinery::Error> {
    migrations::runner().run(conn).map(|_| ())
}
