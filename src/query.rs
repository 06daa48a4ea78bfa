//! Match algebra.
//!
//! Every query is a [`Match`]: a pull-based cursor that writes ascending
//! internal ids into a caller-owned buffer. Leaf matches read posting lists
//! from a snapshot; combinators merge other matches without materializing
//! them, except for sorting and memoization which must see every id.
//!
//! Matches are normally built through
//! [`IndexSearcher`](crate::index::searcher::IndexSearcher), which resolves
//! field names, analyzes values and checks field shapes before any id is read.

pub mod all_entries;
pub mod and;
pub mod and_not;
pub mod buffered;
pub mod compare;
pub mod empty;
pub mod inspect;
pub mod matcher;
pub mod memoize;
pub mod merge;
pub mod multi_term;
pub mod or;
pub mod score;
pub mod sort;
pub mod term;

pub use all_entries::AllEntriesMatch;
pub use and::AndMatch;
pub use and_not::AndNotMatch;
pub use compare::{CompareOp, Comparand, ValueRange};
pub use empty::EmptyMatch;
pub use inspect::InspectionNode;
pub use matcher::{Confidence, Match, collect_ids};
pub use memoize::MemoizedMatch;
pub use multi_term::MultiTermMatch;
pub use or::OrMatch;
pub use score::{BoostMatch, ConstantScore, ScoreFunction};
pub use sort::{SortKey, SortingMatch};
pub use term::TermMatch;
