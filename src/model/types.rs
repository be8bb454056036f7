//! Core type definitions for the application

use std::time::Instant;

use super::catalog::{Track, User};

/// Which section of the UI is currently active/focused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Search,
    Library,
    MainContent,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Library,
            ActiveSection::Library => ActiveSection::MainContent,
            ActiveSection::MainContent => ActiveSection::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::MainContent,
            ActiveSection::Library => ActiveSection::Search,
            ActiveSection::MainContent => ActiveSection::Library,
        }
    }
}

/// An entry in the Library sidebar
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LibraryItem {
    Home,
    AllSongs,
    AdminManage,
    AdminUpload,
}

impl LibraryItem {
    pub fn label(self) -> &'static str {
        match self {
            LibraryItem::Home => "Home",
            LibraryItem::AllSongs => "All songs",
            LibraryItem::AdminManage => "Manage catalog",
            LibraryItem::AdminUpload => "Upload",
        }
    }

    /// Sidebar entries for the given session state. Admin pages only show
    /// up for admin users.
    pub fn for_user(user: Option<&User>) -> Vec<LibraryItem> {
        let mut items = vec![LibraryItem::Home, LibraryItem::AllSongs];
        if user.map(|u| u.is_admin).unwrap_or(false) {
            items.push(LibraryItem::AdminManage);
            items.push(LibraryItem::AdminUpload);
        }
        items
    }
}

/// Login/register overlay mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthField {
    Username,
    Password,
}

/// State of the login/register overlay
#[derive(Clone, Debug)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub username: String,
    pub password: String,
    pub focus: AuthField,
    pub in_flight: bool,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            username: String::new(),
            password: String::new(),
            focus: AuthField::Username,
            in_flight: false,
        }
    }
}

/// Which admin entity table is shown
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Users,
    Artists,
    Albums,
    Songs,
}

impl AdminTab {
    pub fn next(self) -> Self {
        match self {
            AdminTab::Users => AdminTab::Artists,
            AdminTab::Artists => AdminTab::Albums,
            AdminTab::Albums => AdminTab::Songs,
            AdminTab::Songs => AdminTab::Users,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            AdminTab::Users => AdminTab::Songs,
            AdminTab::Artists => AdminTab::Users,
            AdminTab::Albums => AdminTab::Artists,
            AdminTab::Songs => AdminTab::Albums,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AdminTab::Users => "Users",
            AdminTab::Artists => "Artists",
            AdminTab::Albums => "Albums",
            AdminTab::Songs => "Songs",
        }
    }
}

/// A single text field in the admin create/edit overlay
#[derive(Clone, Debug)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
}

impl FormField {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
        }
    }

    pub fn with_value(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// State of the admin create/edit overlay. Field meaning depends on the
/// target tab; numeric foreign keys are parsed on submit.
#[derive(Clone, Debug)]
pub struct AdminForm {
    pub target: AdminTab,
    pub editing_id: Option<i64>,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub error: Option<String>,
    pub in_flight: bool,
}

/// Represents a selected item for action handling
#[derive(Clone, Debug)]
pub enum SelectedItem {
    /// A track within a list; carries the list snapshot so the play queue
    /// can be built from it.
    Track {
        list: Vec<Track>,
        index: usize,
        source_key: String,
    },
    Artist {
        id: i64,
    },
    Album {
        id: i64,
    },
}

/// UI state for the application
#[derive(Clone)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub search_query: String,
    pub library_items: Vec<LibraryItem>,
    pub library_selected: usize,
    pub user: Option<User>,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub show_help_popup: bool,
    pub auth_form: Option<AuthForm>,
    pub admin_form: Option<AdminForm>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::Library,
            search_query: String::new(),
            library_items: LibraryItem::for_user(None),
            library_selected: 0,
            user: None,
            error_message: None,
            error_timestamp: None,
            show_help_popup: false,
            auth_form: None,
            admin_form: None,
        }
    }
}
