//! Find and run the user's preferred editor, browser or pager.
//!
//! Candidates come from the environment (`$EDITOR`/`$VISUAL`, `$BROWSER`,
//! `$GIT_PAGER`/`$PAGER`) followed by commonly installed tools, and are matched
//! against the directories of `PATH`. A [`Resolver`] remembers its first hit; a
//! [`Session`] runs one foreground process of the resolved tool at a time.
//!
//! ```no_run
//! let tools = sensible::Toolbox::from_env();
//! let text = tools.edit_tmp("what do you want to print?")?;
//! println!("{text}");
//! # Ok::<(), sensible::SensibleError>(())
//! ```

pub mod errors;
pub mod find;
pub mod resolver;
pub mod scratch;
pub mod session;
pub mod tool;
pub mod toolbox;

pub use errors::{exit_code_for_io_error, Result, SensibleError};
pub use find::{executable, parse_alias, SearchPath, BASE_PATH};
pub use resolver::{Resolved, Resolver};
pub use session::{Redirect, Session, SpawnAttrs};
pub use tool::ToolKind;
pub use toolbox::Toolbox;
