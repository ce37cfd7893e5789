/// Article index schema, applied on every open.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS t_article (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title VARCHAR NOT NULL,
    tags VARCHAR,
    create_time DATETIME,
    update_time DATETIME
);

CREATE INDEX IF NOT EXISTS idx_t_article_title ON t_article(title);
CREATE INDEX IF NOT EXISTS idx_t_article_tags ON t_article(tags);
CREATE INDEX IF NOT EXISTS idx_t_article_create_time ON t_article(create_time);
CREATE INDEX IF NOT EXISTS idx_t_article_update_time ON t_article(update_time);
"#;
