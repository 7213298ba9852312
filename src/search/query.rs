//! Storage-independent query expressions over content records.
//!
//! A [`ContentQuery`] is a list of [`Clause`]s joined by AND, plus ordering and
//! pagination. The SQLite executor in `db` compiles it to SQL; [`MemoryIndex`]
//! evaluates it directly.

use crate::fields::RATING_FIELD;
use crate::models::post::{
    Post, PostMeta, PostStatus, Taxonomy, Term, TermId, REVIEW_POST_TYPE,
};
use crate::search::params::{RatingFilter, SearchParams};
use crate::utils::sanitize::to_number;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A one-decimal value stored as an integer count of tenths, `DECIMAL(3,1)` style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tenths(pub i32);

impl Tenths {
    /// Rounds the way `%.1f` prints the value.
    pub fn from_f64(value: f64) -> Self {
        let printed: f64 = format!("{value:.1}").parse().unwrap_or(0.0);
        Tenths((printed * 10.0).round() as i32)
    }

    /// Comparison key of a stored value; the SQLite executor computes the same with
    /// `ROUND(value * 10)`.
    pub fn of_stored(value: f64) -> Self {
        Tenths((value * 10.0).round() as i32)
    }
}

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{}", abs / 10, abs % 10)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermClause {
    pub taxonomy: Taxonomy,
    pub ids: Vec<TermId>,
    pub include_children: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetaCompare {
    Exists,
    Equals(Tenths),
    Between(Tenths, Tenths),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetaClause {
    pub key: String,
    pub compare: MetaCompare,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    PostType(String),
    Status(PostStatus),
    /// Every term must appear in the title or the body, case-insensitively.
    Search(Vec<String>),
    /// Every taxonomy clause must match.
    Taxonomy(Vec<TermClause>),
    /// Every condition must hold.
    Meta(Vec<MetaClause>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    DateDesc,
    TitleAsc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentQuery {
    pub clauses: Vec<Clause>,
    pub order: Order,
    pub page: u32,
    /// `None` returns every match.
    pub per_page: Option<u32>,
}

impl ContentQuery {
    /// Published records of one content type, first page, unpaginated.
    pub fn published(post_type: &str) -> Self {
        ContentQuery {
            clauses: vec![
                Clause::PostType(post_type.to_string()),
                Clause::Status(PostStatus::Publish),
            ],
            order: Order::DateDesc,
            page: 1,
            per_page: None,
        }
    }

    pub fn filter(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn paginate(mut self, page: u32, per_page: u32) -> Self {
        self.page = page.max(1);
        self.per_page = Some(per_page);
        self
    }

    pub fn offset(&self) -> u64 {
        match self.per_page {
            Some(per_page) => u64::from(self.page.saturating_sub(1)) * u64::from(per_page),
            None => 0,
        }
    }
}

/// One page of matches and the total number of matches across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage<T> {
    pub items: Vec<T>,
    pub total: u64,
}

pub fn search_terms(search: &str) -> Vec<String> {
    search.split_whitespace().map(str::to_string).collect()
}

pub fn rating_clause(rating: RatingFilter) -> Clause {
    let compare = match rating {
        RatingFilter::Exact(value) => MetaCompare::Equals(value),
        RatingFilter::Range { min, max } => MetaCompare::Between(min, max),
    };
    Clause::Meta(vec![
        MetaClause {
            key: RATING_FIELD.to_string(),
            compare: MetaCompare::Exists,
        },
        MetaClause {
            key: RATING_FIELD.to_string(),
            compare,
        },
    ])
}

/// Listing-endpoint query for validated parameters.
pub fn build_search_query(params: &SearchParams) -> ContentQuery {
    let mut query =
        ContentQuery::published(REVIEW_POST_TYPE).paginate(params.page, params.per_page);

    if let Some(search) = &params.search {
        query = query.filter(Clause::Search(search_terms(search)));
    }

    let mut terms = Vec::new();
    if !params.categories.is_empty() {
        terms.push(TermClause {
            taxonomy: Taxonomy::Category,
            ids: params.categories.clone(),
            include_children: Taxonomy::Category.is_hierarchical(),
        });
    }
    if !params.tags.is_empty() {
        terms.push(TermClause {
            taxonomy: Taxonomy::PostTag,
            ids: params.tags.clone(),
            include_children: false,
        });
    }
    if !terms.is_empty() {
        query = query.filter(Clause::Taxonomy(terms));
    }

    if let Some(rating) = params.rating {
        query = query.filter(rating_clause(rating));
    }

    query
}

/// A record as the in-memory executor sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedPost {
    pub post: Post,
    pub meta: PostMeta,
    pub terms: Vec<TermId>,
}

/// In-memory executor for [`ContentQuery`].
#[derive(Debug, Default)]
pub struct MemoryIndex {
    posts: Vec<IndexedPost>,
    terms: HashMap<TermId, Term>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_term(&mut self, term: Term) {
        self.terms.insert(term.id, term);
    }

    pub fn insert(&mut self, post: IndexedPost) {
        self.posts.push(post);
    }

    pub fn execute(&self, query: &ContentQuery) -> QueryPage<&IndexedPost> {
        let mut matches: Vec<&IndexedPost> = self
            .posts
            .iter()
            .filter(|post| query.clauses.iter().all(|clause| self.matches(clause, post)))
            .collect();

        match query.order {
            Order::DateDesc => matches.sort_by(|a, b| {
                b.post
                    .published_at
                    .cmp(&a.post.published_at)
                    .then(b.post.id.cmp(&a.post.id))
            }),
            Order::TitleAsc => matches.sort_by(|a, b| {
                a.post.title.cmp(&b.post.title).then(a.post.id.cmp(&b.post.id))
            }),
        }

        let total = matches.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let items = match query.per_page {
            Some(per_page) => matches
                .into_iter()
                .skip(offset)
                .take(per_page as usize)
                .collect(),
            None => matches,
        };
        QueryPage { items, total }
    }

    fn matches(&self, clause: &Clause, doc: &IndexedPost) -> bool {
        match clause {
            Clause::PostType(post_type) => &doc.post.post_type == post_type,
            Clause::Status(status) => doc.post.status == *status,
            Clause::Search(terms) => {
                let title = doc.post.title.to_lowercase();
                let content = doc.post.content.to_lowercase();
                terms.iter().all(|term| {
                    let term = term.to_lowercase();
                    title.contains(&term) || content.contains(&term)
                })
            }
            Clause::Taxonomy(terms) => terms.iter().all(|term| self.in_terms(term, doc)),
            Clause::Meta(conditions) => conditions
                .iter()
                .all(|condition| meta_matches(condition, &doc.meta)),
        }
    }

    fn in_terms(&self, clause: &TermClause, doc: &IndexedPost) -> bool {
        let wanted = self.expand(clause);
        doc.terms.iter().any(|id| wanted.contains(id))
    }

    /// Requested ids of the right taxonomy, plus their descendants when asked for.
    fn expand(&self, clause: &TermClause) -> HashSet<TermId> {
        let of_taxonomy =
            |id: &TermId| self.terms.get(id).map(|t| t.taxonomy) == Some(clause.taxonomy);
        let mut wanted: HashSet<TermId> =
            clause.ids.iter().copied().filter(|id| of_taxonomy(id)).collect();

        if clause.include_children {
            loop {
                let children: Vec<TermId> = self
                    .terms
                    .values()
                    .filter(|term| term.parent.map(|p| wanted.contains(&p)).unwrap_or(false))
                    .map(|term| term.id)
                    .filter(|id| !wanted.contains(id))
                    .collect();
                if children.is_empty() {
                    break;
                }
                wanted.extend(children);
            }
        }
        wanted
    }
}

fn meta_matches(condition: &MetaClause, meta: &PostMeta) -> bool {
    let Some(stored) = meta.get(&condition.key) else {
        return false;
    };
    // non-numeric values compare as zero, like a decimal cast would
    let value = Tenths::of_stored(to_number(stored).unwrap_or(0.0));
    match condition.compare {
        MetaCompare::Exists => true,
        MetaCompare::Equals(expected) => value == expected,
        MetaCompare::Between(min, max) => min <= value && value <= max,
    }
}
