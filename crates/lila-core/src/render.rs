//! Renderer capability
//!
//! The dispatcher reports everything user-visible through this trait and
//! never touches a concrete UI.

use crate::attachment::Attachment;
use crate::mode::Mode;
use crate::reply::ReplyView;

pub trait Renderer {
    /// A user turn was accepted
    fn render_user_turn(&mut self, text: &str);

    /// A new assistant turn begins (shown empty until content arrives)
    fn begin_assistant_turn(&mut self) {}

    /// Replace the in-progress assistant turn with the full reply so far
    ///
    /// Called after every delta with the whole buffer re-parsed; earlier
    /// output may be revised (a reasoning trace collapsing, for example).
    fn render_assistant_delta(&mut self, reply: &ReplyView);

    /// Replace the in-progress assistant turn with a verbatim monospace report
    fn render_report(&mut self, report: &str);

    /// Transient placeholder in the in-progress assistant turn
    fn render_status(&mut self, status: &str);

    /// Replace the in-progress assistant turn with an error line
    fn render_error(&mut self, message: &str);

    /// The assistant turn will not change any more
    fn end_assistant_turn(&mut self) {}

    /// Validation message that does not start a turn
    fn render_notice(&mut self, message: &str);

    fn attachment_staged(&mut self, _attachment: &Attachment) {}

    fn attachment_cleared(&mut self) {}

    /// Input is disabled while `loading` is true
    fn set_loading(&mut self, _loading: bool) {}

    fn mode_changed(&mut self, _mode: Mode) {}
}
