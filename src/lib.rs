//! # thread-lexicon
//!
//! Deterministic topic discovery for social-media reply threads.
//!
//! Given a prompt-style thread ("what's the best action movie?") and a
//! validation lookup of known names, the engine:
//!
//! - extracts candidate phrases from each reply with layered text
//!   heuristics (quotes, title casing, short answers, alt text),
//! - aggregates validated candidates into a small per-thread dictionary,
//!   filtering fragments and merging near-duplicate canonicals,
//! - labels each reply with the set of dictionary topics it names,
//!   letting pure agreement replies ("yes this one", "💯") inherit
//!   their parent's topics.
//!
//! Everything is pure computation over owned data: no network, no
//! persistence, and byte-identical output for identical input.
//!
//! ```
//! use std::collections::BTreeMap;
//! use thread_lexicon::lookup::{Confidence, EmbedTitleMap, ValidationLookup};
//! use thread_lexicon::pipeline::ThreadEngine;
//! use thread_lexicon::post::{Post, TextContent, Thread};
//!
//! let posts = vec![Post::root("root"), Post::reply("p1", "root"), Post::reply("p2", "root")];
//! let texts = BTreeMap::from([
//!     ("root".to_string(), TextContent::own("best action movie?")),
//!     ("p1".to_string(), TextContent::own("Die Hard")),
//!     ("p2".to_string(), TextContent::own("Die Hard")),
//! ]);
//! let thread = Thread::new(posts, texts)?;
//!
//! let lookup = ValidationLookup::from_entries([("die hard", "Die Hard", Confidence::High)]);
//! let analysis = ThreadEngine::default().analyze(&thread, &lookup, &EmbedTitleMap::new());
//! assert!(analysis.dictionary.contains("Die Hard"));
//! # Ok::<(), thread_lexicon::error::LexiconError>(())
//! ```

pub mod config;
pub mod dictionary;
pub mod error;
pub mod extract;
pub mod label;
pub mod lookup;
pub mod pipeline;
pub mod post;
pub mod text;

pub use config::EngineConfig;
pub use dictionary::ThreadDictionary;
pub use error::{LexiconError, LexiconResult};
pub use label::{LabelAssignment, LabelMap, LabelSource};
pub use lookup::{Confidence, ValidationLookup};
pub use pipeline::{ThreadAnalysis, ThreadEngine};
pub use post::{Post, TextContent, Thread};
