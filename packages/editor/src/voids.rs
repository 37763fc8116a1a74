//! Image and link insertion.
//!
//! Both kinds are void: their content is fixed, so the caret never enters
//! them. Images are blocks and are always followed by an empty paragraph for
//! the caret to land in. Links are inline and always have a leaf on each
//! side.

use crate::editor::Editor;
use crate::mutations::{Mutation, MutationError, NodeProperties};
use lectern_model::{ElementKind, Node, Path, Point, Range};
use tracing::{debug, info, instrument, warn};

impl Editor {
    /// Inserts an image next to the block at the caret (at the end of the
    /// document without a selection), then an empty paragraph after it that
    /// receives the caret.
    #[instrument(skip(self, url), fields(url_len = url.len()))]
    pub fn insert_image(&mut self, url: &str, alt: &str) -> bool {
        if url.trim().is_empty() {
            warn!("image insertion with an empty url ignored");
            return false;
        }
        let inserted = self.transact("insert_image", |ed| {
            let path = ed.insert_block(Node::image(url, alt))?;
            let after = path.next().ok_or_else(|| {
                MutationError::InvalidStructure("image has no sibling slot".to_string())
            })?;
            ed.insert_at(after.clone(), Node::paragraph(""))?;
            ed.set_selection(Some(Range::collapsed(Point::new(after.child(0), 0))));
            Ok(())
        });
        if inserted {
            info!("image inserted");
        }
        inserted
    }

    /// Removes the image at `path`; anything else there is left alone.
    pub fn remove_image(&mut self, path: &Path) -> bool {
        let is_image = matches!(
            self.document().get(path).and_then(Node::kind),
            Some(ElementKind::Image { .. })
        );
        if !is_image {
            debug!(%path, "no image to remove");
            return false;
        }
        self.remove_node(path)
    }

    /// Links the selected text to `url`, or inserts a new link showing
    /// `text` (the configured default when empty) at the caret. The caret
    /// ends up right after the link.
    #[instrument(skip(self))]
    pub fn insert_link(&mut self, url: &str, text: Option<&str>) -> bool {
        if url.trim().is_empty() {
            return false;
        }
        let kind = ElementKind::link(url);
        match self.selection().cloned() {
            Some(range) if range.is_expanded() => self.transact("insert_link", |ed| {
                // Links do not nest: existing ones give their text back first
                let links = ed.links_in(&range);
                if !links.is_empty() {
                    let tracked = ed.range_ref(range.clone());
                    ed.unwrap_matching(&range, &|k: &ElementKind| matches!(k, ElementKind::Link { .. }), false)?;
                    let range = ed.resolve_range(tracked)?;
                    ed.set_selection(Some(range));
                }
                let range = ed.selection().cloned().unwrap_or(range);
                let wrappers = ed.wrap_inline(&range, kind)?;
                if let Some(last) = wrappers.last() {
                    let after = ed.point_after_inline(last)?;
                    ed.set_selection(Some(Range::collapsed(after)));
                }
                Ok(())
            }),
            _ => {
                let text = text
                    .filter(|t| !t.is_empty())
                    .unwrap_or(&self.options().default_link_text)
                    .to_string();
                self.transact("insert_link", |ed| {
                    ed.insert_inline(Node::element(kind, vec![Node::text(text)]))
                        .map(|_| ())
                })
            }
        }
    }

    /// Replaces the url of the link at `path`. Empty or unchanged urls are
    /// ignored.
    #[instrument(skip(self))]
    pub fn edit_link_url(&mut self, path: &Path, url: &str) -> bool {
        let Some(current) = self.document().get(path).and_then(Node::kind).cloned() else {
            return false;
        };
        let ElementKind::Link { url: old } = &current else {
            debug!(%path, "not a link");
            return false;
        };
        if url.is_empty() || url == old {
            return false;
        }
        self.transact("edit_link_url", |ed| {
            ed.apply(Mutation::SetNode {
                path: path.clone(),
                properties: NodeProperties::Element(current.clone()),
                new_properties: NodeProperties::Element(ElementKind::link(url)),
            })
        })
    }

    /// The link overlapping the selection, with its url.
    pub fn active_link(&self) -> Option<(Path, String)> {
        let range = self.selection()?;
        let path = self.links_in(range).into_iter().next()?;
        let url = self.document().get(&path)?.kind()?.url()?.to_string();
        Some((path, url))
    }
}
