//! One resolver per tool kind, with one-call helpers on top.
use std::io::Read;
use std::path::Path;

use url::Url;

use crate::errors::Result;
use crate::resolver::Resolver;
use crate::session::Session;
use crate::tool::ToolKind;

/// Owns the editor, browser and pager resolvers of a program.
///
/// Build it once (usually with [`Toolbox::from_env`]) and pass it to whatever
/// needs to hand something off to the user's tools.
#[derive(Debug)]
pub struct Toolbox {
    editor: Resolver,
    browser: Resolver,
    pager: Resolver,
}

impl Toolbox {
    pub fn from_env() -> Self {
        Self::new(
            Resolver::new(ToolKind::Editor),
            Resolver::new(ToolKind::Browser),
            Resolver::new(ToolKind::Pager),
        )
    }

    pub fn new(editor: Resolver, browser: Resolver, pager: Resolver) -> Self {
        Self {
            editor,
            browser,
            pager,
        }
    }

    pub fn resolver(&self, kind: ToolKind) -> &Resolver {
        match kind {
            ToolKind::Editor => &self.editor,
            ToolKind::Browser => &self.browser,
            ToolKind::Pager => &self.pager,
        }
    }

    /// A fresh session for `kind`; resolution happens at most once per kind.
    pub fn session(&self, kind: ToolKind) -> Result<Session> {
        self.resolver(kind).find()
    }

    pub fn editor(&self) -> Result<Session> {
        self.session(ToolKind::Editor)
    }

    pub fn browser(&self) -> Result<Session> {
        self.session(ToolKind::Browser)
    }

    pub fn pager(&self) -> Result<Session> {
        self.session(ToolKind::Pager)
    }

    pub fn edit<P: AsRef<Path>>(&self, files: &[P]) -> Result<()> {
        self.editor()?.edit(files)
    }

    pub fn edit_tmp(&self, text: &str) -> Result<String> {
        self.editor()?.edit_tmp(text)
    }

    pub fn browse(&self, urls: &[Url]) -> Result<()> {
        self.browser()?.browse(urls)
    }

    pub fn page<R>(&self, reader: R) -> Result<()>
    where
        R: Read + Send + 'static,
    {
        self.pager()?.page(reader)
    }
}

impl Default for Toolbox {
    fn default() -> Self {
        Self::from_env()
    }
}
