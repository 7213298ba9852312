#[cfg(feature = "ssr")]
mod db_impl {
    use crate::fields::{MetaWrite, PRODUCT_FIELD};
    use crate::models::post::{
        slugify, NewPost, Post, PostId, PostMeta, ReviewRow, Taxonomy, Term, TermId,
    };
    use crate::search::query::{
        Clause, ContentQuery, MetaClause, MetaCompare, Order, QueryPage, TermClause,
    };
    use crate::utils::sanitize::absint;
    use chrono::{DateTime, Utc};
    use leptos::logging;
    use leptos::logging::log;
    use rusqlite::types::Value;
    use rusqlite::functions::FunctionFlags;
    use rusqlite::{params, params_from_iter, Connection, Error, OptionalExtension};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;


    const POST_COLUMNS: &str =
        "p.id, p.post_type, p.slug, p.title, p.content, p.status, p.published_at, p.thumbnail_url";

    const CASE_FOLD: &str = "prm_fold";

    /// One-decimal comparison key of a meta value, matching `Tenths::of_stored`.
    const META_TENTHS: &str = "CAST(ROUND(CAST(m.meta_value AS REAL) * 10) AS INTEGER)";

    // Define a struct to represent a database connection
    #[derive(Debug, Clone)]
    pub struct Database {
        conn: Arc<Mutex<Connection>>,
    }

    impl Database {
        // Create a new database connection
        pub fn new(db_path: &str) -> Result<Self, Error> {
            let conn = Connection::open(db_path)?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            register_case_fold(&conn)?;
            logging::log!("[DB] Connection established at: {}", db_path);
            Ok(Database {
                conn: Arc::new(Mutex::new(conn)),
            })
        }

        // Create the database schema
        pub async fn create_schema(&self) -> Result<(), Error> {
            let conn = self.conn.lock().await;

            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS posts (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    post_type TEXT NOT NULL,
                    slug TEXT NOT NULL,
                    title TEXT NOT NULL DEFAULT '',
                    content TEXT NOT NULL DEFAULT '',
                    status TEXT NOT NULL DEFAULT 'draft',
                    published_at INTEGER NOT NULL,
                    thumbnail_url TEXT,
                    UNIQUE (post_type, slug)
                );
                CREATE INDEX IF NOT EXISTS idx_posts_listing
                    ON posts (post_type, status, published_at);",
            )
            .map_err(|e| {
                logging::error!("[DB] Failed creating posts table: {}", e);
                e
            })?;

            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS post_meta (
                    post_id INTEGER NOT NULL,
                    meta_key TEXT NOT NULL,
                    meta_value TEXT NOT NULL,
                    PRIMARY KEY (post_id, meta_key),
                    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE
                );",
            )
            .map_err(|e| {
                logging::error!("[DB] Failed creating post_meta table: {}", e);
                e
            })?;

            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS terms (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    taxonomy TEXT NOT NULL,
                    name TEXT NOT NULL,
                    slug TEXT NOT NULL,
                    parent INTEGER REFERENCES terms(id) ON DELETE SET NULL
                );
                CREATE TABLE IF NOT EXISTS term_relationships (
                    post_id INTEGER NOT NULL,
                    term_id INTEGER NOT NULL,
                    PRIMARY KEY (post_id, term_id),
                    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
                    FOREIGN KEY (term_id) REFERENCES terms(id) ON DELETE CASCADE
                );",
            )
            .map_err(|e| {
                logging::error!("[DB] Failed creating taxonomy tables: {}", e);
                e
            })?;

            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS options (
                    name TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(|e| {
                logging::error!("[DB] Failed creating options table: {}", e);
                e
            })?;
            Ok(())
        }

        /// Inserts a record with its terms and meta in one transaction.
        pub async fn create_post(
            &self,
            new_post: &NewPost,
            terms: &[TermId],
            meta: &[(&str, MetaWrite)],
        ) -> Result<Post, Error> {
            let mut conn = self.conn.lock().await;
            let tx = conn.transaction()?;

            let base_slug = new_post
                .slug
                .as_deref()
                .map(slugify)
                .unwrap_or_else(|| slugify(&new_post.title));
            let slug = unique_slug(&tx, &new_post.post_type, &base_slug)?;
            let published_at = new_post.published_at.unwrap_or_else(Utc::now);

            tx.execute(
                "INSERT INTO posts (post_type, slug, title, content, status, published_at, thumbnail_url)
                VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    &new_post.post_type,
                    &slug,
                    &new_post.title,
                    &new_post.content,
                    new_post.status.as_str(),
                    published_at.timestamp(),
                    &new_post.thumbnail_url,
                ],
            )?;
            let id = tx.last_insert_rowid();

            for term_id in terms {
                tx.execute(
                    "INSERT OR IGNORE INTO term_relationships (post_id, term_id)
                    SELECT ?, id FROM terms WHERE id = ?",
                    params![id, term_id],
                )?;
            }
            apply_meta(&tx, id, meta)?;

            let post = tx.query_row(
                &format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = ?"),
                [id],
                post_from_row,
            )?;
            tx.commit()?;
            log!("[DB] Created {} {} ({})", post.post_type, post.id, post.slug);
            Ok(post)
        }

        pub async fn get_post(&self, id: PostId) -> Result<Option<Post>, Error> {
            let conn = self.conn.lock().await;
            conn.query_row(
                &format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = ?"),
                [id],
                post_from_row,
            )
            .optional()
        }

        /// Removes a record with its meta and term relationships.
        pub async fn delete_post(&self, id: PostId) -> Result<bool, Error> {
            let mut conn = self.conn.lock().await;
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM post_meta WHERE post_id = ?", [id])?;
            tx.execute("DELETE FROM term_relationships WHERE post_id = ?", [id])?;
            let deleted = tx.execute("DELETE FROM posts WHERE id = ?", [id])?;
            tx.commit()?;
            if deleted > 0 {
                log!("[DB] Post deleted: {}", id);
            }
            Ok(deleted > 0)
        }

        pub async fn insert_term(
            &self,
            taxonomy: Taxonomy,
            name: &str,
            parent: Option<TermId>,
        ) -> Result<Term, Error> {
            let conn = self.conn.lock().await;
            let slug = slugify(name);
            conn.execute(
                "INSERT INTO terms (taxonomy, name, slug, parent) VALUES (?, ?, ?, ?)",
                params![taxonomy.as_str(), name, &slug, parent],
            )?;
            let id = conn.last_insert_rowid();
            log!("[DB] Term created: {} {} ({})", taxonomy.as_str(), id, name);
            Ok(Term {
                id,
                taxonomy,
                name: name.to_string(),
                slug,
                parent,
            })
        }

        pub async fn get_meta(&self, post_id: PostId) -> Result<PostMeta, Error> {
            let conn = self.conn.lock().await;
            let mut meta = load_meta(&conn, &[post_id])?;
            Ok(meta.remove(&post_id).unwrap_or_default())
        }

        pub async fn update_meta(
            &self,
            post_id: PostId,
            writes: &[(&str, MetaWrite)],
        ) -> Result<(), Error> {
            let mut conn = self.conn.lock().await;
            let tx = conn.transaction()?;
            apply_meta(&tx, post_id, writes)?;
            tx.commit()?;
            log!("[DB] Updated {} meta field(s) on post {}", writes.len(), post_id);
            Ok(())
        }

        pub async fn query_posts(&self, query: &ContentQuery) -> Result<QueryPage<Post>, Error> {
            let conn = self.conn.lock().await;
            run_query(&conn, query)
        }

        /// Runs `query` and attaches meta and the referenced product to every match.
        pub async fn search_reviews(
            &self,
            query: &ContentQuery,
        ) -> Result<QueryPage<ReviewRow>, Error> {
            let conn = self.conn.lock().await;
            let page = run_query(&conn, query)?;

            let ids: Vec<PostId> = page.items.iter().map(|post| post.id).collect();
            let mut meta = load_meta(&conn, &ids)?;

            let product_ids: Vec<PostId> = meta
                .values()
                .filter_map(|meta| meta.get(PRODUCT_FIELD))
                .map(|value| absint(value) as PostId)
                .filter(|id| *id > 0)
                .collect();
            let products = load_posts(&conn, &product_ids)?;

            let items = page
                .items
                .into_iter()
                .map(|post| {
                    let meta = meta.remove(&post.id).unwrap_or_default();
                    let product = meta
                        .get(PRODUCT_FIELD)
                        .and_then(|value| products.get(&(absint(value) as PostId)))
                        .cloned();
                    ReviewRow {
                        post,
                        meta,
                        product,
                    }
                })
                .collect::<Vec<_>>();

            log!("[DB] Review query matched {} of {} record(s)", items.len(), page.total);
            Ok(QueryPage {
                items,
                total: page.total,
            })
        }

        pub async fn get_option(&self, name: &str) -> Result<Option<String>, Error> {
            let conn = self.conn.lock().await;
            conn.query_row("SELECT value FROM options WHERE name = ?", [name], |row| {
                row.get(0)
            })
            .optional()
        }

        pub async fn update_option(&self, name: &str, value: &str) -> Result<(), Error> {
            let conn = self.conn.lock().await;
            conn.execute(
                "INSERT INTO options (name, value) VALUES (?, ?)
                ON CONFLICT(name) DO UPDATE SET value = excluded.value",
                params![name, value],
            )?;
            log!("[DB] Option updated: {}", name);
            Ok(())
        }
    }

    fn post_from_row(row: &rusqlite::Row<'_>) -> Result<Post, Error> {
        let status: String = row.get(5)?;
        let published_at: i64 = row.get(6)?;
        Ok(Post {
            id: row.get(0)?,
            post_type: row.get(1)?,
            slug: row.get(2)?,
            title: row.get(3)?,
            content: row.get(4)?,
            // unknown statuses are treated as drafts and never listed
            status: status.parse().unwrap_or_default(),
            published_at: DateTime::<Utc>::from_timestamp(published_at, 0).unwrap_or_default(),
            thumbnail_url: row.get(7)?,
        })
    }

    fn unique_slug(conn: &Connection, post_type: &str, base: &str) -> Result<String, Error> {
        let mut candidate = base.to_string();
        let mut suffix = 2;
        loop {
            let taken: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM posts WHERE post_type = ? AND slug = ?)",
                params![post_type, &candidate],
                |row| row.get(0),
            )?;
            if !taken {
                return Ok(candidate);
            }
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
    }

    fn apply_meta(conn: &Connection, post_id: PostId, writes: &[(&str, MetaWrite)]) -> Result<(), Error> {
        for (key, write) in writes {
            match write {
                MetaWrite::Set(value) => {
                    conn.execute(
                        "INSERT INTO post_meta (post_id, meta_key, meta_value) VALUES (?, ?, ?)
                        ON CONFLICT(post_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value",
                        params![post_id, key, value],
                    )?;
                }
                MetaWrite::Delete => {
                    conn.execute(
                        "DELETE FROM post_meta WHERE post_id = ? AND meta_key = ?",
                        params![post_id, key],
                    )?;
                }
            }
        }
        Ok(())
    }

    fn placeholders(count: usize) -> String {
        vec!["?"; count].join(", ")
    }

    fn load_meta(conn: &Connection, ids: &[PostId]) -> Result<HashMap<PostId, PostMeta>, Error> {
        let mut meta: HashMap<PostId, PostMeta> = HashMap::new();
        if ids.is_empty() {
            return Ok(meta);
        }
        let sql = format!(
            "SELECT post_id, meta_key, meta_value FROM post_meta WHERE post_id IN ({})",
            placeholders(ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), |row| {
            Ok((
                row.get::<_, PostId>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for row in rows {
            let (post_id, key, value) = row?;
            meta.entry(post_id).or_default().insert(key, value);
        }
        Ok(meta)
    }

    fn load_posts(conn: &Connection, ids: &[PostId]) -> Result<HashMap<PostId, Post>, Error> {
        let mut posts = HashMap::new();
        if ids.is_empty() {
            return Ok(posts);
        }
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p WHERE p.id IN ({})",
            placeholders(ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), post_from_row)?;
        for row in rows {
            let post = row?;
            posts.insert(post.id, post);
        }
        Ok(posts)
    }

    fn run_query(conn: &Connection, query: &ContentQuery) -> Result<QueryPage<Post>, Error> {
        let mut values = Vec::new();
        let filter = compile_clauses(&query.clauses, &mut values);

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM posts p WHERE {filter}"),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;

        let order = match query.order {
            Order::DateDesc => "p.published_at DESC, p.id DESC",
            Order::TitleAsc => "p.title ASC, p.id ASC",
        };
        let mut sql = format!("SELECT {POST_COLUMNS} FROM posts p WHERE {filter} ORDER BY {order}");
        if let Some(per_page) = query.per_page {
            sql.push_str(" LIMIT ? OFFSET ?");
            values.push(Value::Integer(i64::from(per_page)));
            values.push(Value::Integer(i64::try_from(query.offset()).unwrap_or(i64::MAX)));
        }

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(values.iter()), post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(QueryPage {
            items,
            total: total.max(0) as u64,
        })
    }

    fn compile_clauses(clauses: &[Clause], values: &mut Vec<Value>) -> String {
        if clauses.is_empty() {
            return "1 = 1".to_string();
        }
        clauses
            .iter()
            .map(|clause| compile_clause(clause, values))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn compile_clause(clause: &Clause, values: &mut Vec<Value>) -> String {
        match clause {
            Clause::PostType(post_type) => {
                values.push(Value::Text(post_type.clone()));
                "p.post_type = ?".to_string()
            }
            Clause::Status(status) => {
                values.push(Value::Text(status.as_str().to_string()));
                "p.status = ?".to_string()
            }
            Clause::Search(terms) => {
                if terms.is_empty() {
                    return "1 = 1".to_string();
                }
                let parts: Vec<String> = terms
                    .iter()
                    .map(|term| {
                        let pattern = like_pattern(&term.to_lowercase());
                        values.push(Value::Text(pattern.clone()));
                        values.push(Value::Text(pattern));
                        format!(
                            "({CASE_FOLD}(p.title) LIKE ? ESCAPE '\\' OR {CASE_FOLD}(p.content) LIKE ? ESCAPE '\\')"
                        )
                    })
                    .collect();
                format!("({})", parts.join(" AND "))
            }
            Clause::Taxonomy(terms) => {
                let parts: Vec<String> = terms
                    .iter()
                    .map(|term| compile_term_clause(term, values))
                    .collect();
                join_all(parts)
            }
            Clause::Meta(conditions) => {
                let parts: Vec<String> = conditions
                    .iter()
                    .map(|condition| compile_meta_clause(condition, values))
                    .collect();
                join_all(parts)
            }
        }
    }

    fn compile_term_clause(clause: &TermClause, values: &mut Vec<Value>) -> String {
        if clause.ids.is_empty() {
            return "0 = 1".to_string();
        }
        values.push(Value::Text(clause.taxonomy.as_str().to_string()));
        values.extend(clause.ids.iter().map(|id| Value::Integer(*id)));
        let ids = placeholders(clause.ids.len());

        if clause.include_children {
            format!(
                "EXISTS (SELECT 1 FROM term_relationships tr WHERE tr.post_id = p.id AND tr.term_id IN (
                    WITH RECURSIVE tree(id) AS (
                        SELECT id FROM terms WHERE taxonomy = ? AND id IN ({ids})
                        UNION SELECT t.id FROM terms t JOIN tree ON t.parent = tree.id
                    )
                    SELECT id FROM tree))"
            )
        } else {
            format!(
                "EXISTS (SELECT 1 FROM term_relationships tr JOIN terms t ON t.id = tr.term_id
                    WHERE tr.post_id = p.id AND t.taxonomy = ? AND t.id IN ({ids}))"
            )
        }
    }

    fn compile_meta_clause(clause: &MetaClause, values: &mut Vec<Value>) -> String {
        values.push(Value::Text(clause.key.clone()));
        let base = "EXISTS (SELECT 1 FROM post_meta m WHERE m.post_id = p.id AND m.meta_key = ?";
        match clause.compare {
            MetaCompare::Exists => format!("{base})"),
            MetaCompare::Equals(value) => {
                values.push(Value::Integer(i64::from(value.0)));
                format!("{base} AND {META_TENTHS} = ?)")
            }
            MetaCompare::Between(min, max) => {
                values.push(Value::Integer(i64::from(min.0)));
                values.push(Value::Integer(i64::from(max.0)));
                format!("{base} AND {META_TENTHS} BETWEEN ? AND ?)")
            }
        }
    }

    fn join_all(parts: Vec<String>) -> String {
        if parts.is_empty() {
            return "1 = 1".to_string();
        }
        format!("({})", parts.join(" AND "))
    }

    /// Lowercases with Unicode rules; the built-in `LIKE` only folds ASCII.
    fn register_case_fold(conn: &Connection) -> Result<(), Error> {
        conn.create_scalar_function(
            CASE_FOLD,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|text| text.to_lowercase())),
        )
    }

    fn like_pattern(term: &str) -> String {
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{escaped}%")
    }
}

#[cfg(feature = "ssr")]
pub use db_impl::Database;
