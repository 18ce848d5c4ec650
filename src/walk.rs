//! Depth-first traversal of the drive with prefix pruning.

use std::collections::{HashSet, VecDeque};

use crate::client::DriveApi;
use crate::error::Result;
use crate::models::{ChildReference, DriveItem};
use crate::prefix::{child_path, join_path, PathPrefix};
use crate::report::{Event, Reporter};

/// ID the API accepts for the top of "My Drive".
pub const ROOT_FOLDER_ID: &str = "root";

/// Called for every item that lies under the prefix.
#[allow(async_fn_in_trait)]
pub trait FileHandler<A: DriveApi> {
    /// `path` holds the names of the folders containing `item`.
    async fn on_file(&mut self, api: &A, item: &DriveItem, path: &[String]);
}

/// Counts gathered during one walk.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalkSummary {
    pub folders_listed: usize,
    pub folders_ignored: usize,
    pub files_matched: usize,
}

/// A folder whose children are being processed.
struct Frame {
    folder_id: String,
    path: Vec<String>,
    pending: VecDeque<ChildReference>,
    next_page: Option<String>,
    exhausted: bool,
}

impl Frame {
    fn new(folder_id: String, path: Vec<String>) -> Self {
        Self {
            folder_id,
            path,
            pending: VecDeque::new(),
            next_page: None,
            exhausted: false,
        }
    }
}

/// Walks the folder tree, handing matching files to a [`FileHandler`].
pub struct Walker<'a, A, R: ?Sized> {
    api: &'a A,
    prefix: &'a PathPrefix,
    reporter: &'a R,
    include_folders: bool,
}

impl<'a, A: DriveApi, R: Reporter + ?Sized> Walker<'a, A, R> {
    pub fn new(api: &'a A, prefix: &'a PathPrefix, reporter: &'a R) -> Self {
        Self {
            api,
            prefix,
            reporter,
            include_folders: false,
        }
    }

    /// Also hand folders under the prefix to the handler.
    pub fn include_folders(mut self, include: bool) -> Self {
        self.include_folders = include;
        self
    }

    /// Walk from the drive root.
    pub async fn walk<H: FileHandler<A>>(&self, handler: &mut H) -> Result<WalkSummary> {
        self.walk_from(ROOT_FOLDER_ID, handler).await
    }

    /// Walk the tree below `folder_id`, which counts as the empty path.
    ///
    /// Children are processed in listing order and a subfolder is finished
    /// before its later siblings are fetched. Any remote error ends the
    /// whole walk.
    pub async fn walk_from<H: FileHandler<A>>(
        &self,
        folder_id: &str,
        handler: &mut H,
    ) -> Result<WalkSummary> {
        let mut summary = WalkSummary::default();
        let mut visited = HashSet::new();
        let mut stack = Vec::new();

        visited.insert(folder_id.to_string());
        stack.push(self.enter(folder_id.to_string(), Vec::new(), &mut summary));

        while let Some(frame) = stack.last_mut() {
            if let Some(child) = frame.pending.pop_front() {
                let path = frame.path.clone();
                let item = self.api.get_file(&child.id).await?;
                if let Some(next) = self
                    .visit(item, path, handler, &mut visited, &mut summary)
                    .await
                {
                    stack.push(next);
                }
                continue;
            }

            if frame.exhausted {
                stack.pop();
                continue;
            }

            let page = self
                .api
                .list_children(&frame.folder_id, frame.next_page.as_deref())
                .await?;
            frame.next_page = page.next_page().map(str::to_string);
            frame.exhausted = frame.next_page.is_none();
            frame.pending.extend(page.items);
        }

        Ok(summary)
    }

    fn enter(&self, folder_id: String, path: Vec<String>, summary: &mut WalkSummary) -> Frame {
        self.reporter.report(Event::Listing {
            path: join_path(&path),
        });
        summary.folders_listed += 1;
        Frame::new(folder_id, path)
    }

    /// Process one child of the folder at `path`; returns a frame to descend into.
    async fn visit<H: FileHandler<A>>(
        &self,
        item: DriveItem,
        path: Vec<String>,
        handler: &mut H,
        visited: &mut HashSet<String>,
        summary: &mut WalkSummary,
    ) -> Option<Frame> {
        let is_folder = item.is_folder();

        if (!is_folder || self.include_folders) && self.prefix.is_satisfied_by(&path) {
            self.reporter.report(Event::File {
                path: child_path(&path, &item.title),
                id: item.id.clone(),
            });
            summary.files_matched += 1;
            handler.on_file(self.api, &item, &path).await;
        }

        if !is_folder {
            return None;
        }

        let mut next = path;
        next.push(item.title);
        if !self.prefix.admits(&next) {
            self.reporter.report(Event::IgnoredFolder {
                path: join_path(&next),
                id: item.id,
            });
            summary.folders_ignored += 1;
            return None;
        }

        if !visited.insert(item.id.clone()) {
            tracing::warn!(id = %item.id, "Folder reached twice, not listing again");
            self.reporter.report(Event::RevisitedFolder {
                path: join_path(&next),
                id: item.id,
            });
            return None;
        }

        Some(self.enter(item.id, next, summary))
    }
}
