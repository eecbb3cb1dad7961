pub mod editor_session;

pub use editor_session::FilterEditorSession;
