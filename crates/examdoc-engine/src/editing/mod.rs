/*!
 * Document editing core.
 *
 * The host UI holds one [`DocumentState`] per question/answer body: a plain
 * text buffer plus three keyed stores (images, position overrides,
 * answer-line configs). All structured edits flow through the mutation API,
 * which performs the store write and the buffer splice together in one call
 * so a token never outlives its record across an API boundary.
 *
 * Everything here is single-threaded and synchronous: no operation blocks,
 * suspends, retries, or touches state outside the passed document. The
 * parser and renderer read the state at call time, so they are safe to run
 * on every display refresh interleaved with mutations.
 *
 * The one unmediated path is [`DocumentState::replace_buffer`] (the host's
 * raw editing surface), which can strand tokens without records or vice
 * versa. That is recoverable by design: rendering degrades to diagnostic
 * placeholders and [`crate::reconcile::reconcile`] reports the drift.
 */

pub mod document;
pub mod format;
pub mod mutations;

pub use document::DocumentState;
pub use format::toggle_style;
pub use mutations::{ImageSource, InsertAt, LinesSpec, MutationError, MAX_LINES, MIN_LINES};
