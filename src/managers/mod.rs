// BookmarkPro state managers
// Managers own mutable state; the library manager is the single owner of
// all bookmark data in the process.

pub mod library_manager;
