//! The fixed registry of overridable template sections.

use std::fmt;

use crate::config::schema::OverrideBlocks;

/// A named section of the configuration template.
///
/// The set is closed: the skeleton includes each non-main section exactly
/// once, and the composer binds every section before any render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Main,
    Root,
    Http,
    Server,
    LuaInit,
    LuaWorkerInit,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Main,
        Section::Root,
        Section::Http,
        Section::Server,
        Section::LuaInit,
        Section::LuaWorkerInit,
    ];

    /// Template name the section is registered under.
    pub fn name(self) -> &'static str {
        match self {
            Section::Main => "main",
            Section::Root => "root",
            Section::Http => "http",
            Section::Server => "server",
            Section::LuaInit => "lua-init",
            Section::LuaWorkerInit => "lua-worker-init",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl OverrideBlocks {
    /// Caller content for `section`; empty means "keep the default".
    pub fn get(&self, section: Section) -> &str {
        match section {
            Section::Main => &self.main,
            Section::Root => &self.root,
            Section::Http => &self.http,
            Section::Server => &self.server,
            Section::LuaInit => &self.lua_init,
            Section::LuaWorkerInit => &self.lua_worker_init,
        }
    }

    /// Sections whose content replaces the default.
    pub fn overridden(&self) -> impl Iterator<Item = Section> + '_ {
        Section::ALL
            .into_iter()
            .filter(|section| !self.get(*section).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = Section::ALL.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Section::ALL.len());
    }

    #[test]
    fn test_overridden_sections() {
        let blocks = OverrideBlocks {
            server: "location /x {}".into(),
            lua_worker_init: "ngx.log(ngx.INFO, 'up')".into(),
            ..OverrideBlocks::default()
        };
        let overridden: Vec<_> = blocks.overridden().collect();
        assert_eq!(overridden, vec![Section::Server, Section::LuaWorkerInit]);
        assert_eq!(blocks.get(Section::Root), "");
        assert_eq!(OverrideBlocks::default().overridden().count(), 0);
    }
}
