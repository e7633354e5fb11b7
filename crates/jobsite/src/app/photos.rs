use super::{ApiResponse, JobsiteApp, Notice};
use crate::model::{PhotoSection, Site};
use crate::session::{Page, SessionContext};
use crate::storage::{preview, PhotoPreview};

fn paths(site: &Site, section: Option<PhotoSection>) -> Vec<String> {
    match section {
        Some(section) => site.section_photos.bucket(section).clone(),
        None => site
            .section_photos
            .all_paths()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

impl JobsiteApp {
    /// Stores the upload and appends its path to `section` of the
    /// selected site.
    pub fn add_photo(
        &mut self,
        session: &mut SessionContext,
        section: PhotoSection,
        content: &[u8],
        original_name: &str,
    ) -> ApiResponse<String> {
        session.navigate(Page::Photos);
        self.with_active_site(session, |site, photos| {
            let path = photos.add_photo(
                site.section_photos.bucket_mut(section),
                content,
                original_name,
            )?;
            Ok((path, Notice::success(format!("Photo added to {}", section))))
        })
    }

    /// Drops the reference at `index`; the file stays on disk.
    pub fn remove_photo(
        &mut self,
        session: &mut SessionContext,
        section: PhotoSection,
        index: usize,
    ) -> ApiResponse<String> {
        session.navigate(Page::Photos);
        self.with_active_site(session, |site, _| {
            let removed = site.remove_photo(section, index)?;
            Ok((removed, Notice::success("Photo reference removed")))
        })
    }

    /// Paths of one section, or of every section (deduplicated) when
    /// `section` is `None`.
    pub fn list_photos(
        &self,
        session: &mut SessionContext,
        section: Option<PhotoSection>,
    ) -> ApiResponse<Vec<String>> {
        session.navigate(Page::Photos);
        self.read_active_site(session, |_, site| paths(site, section))
    }

    pub fn preview_photos(
        &self,
        session: &mut SessionContext,
        section: Option<PhotoSection>,
    ) -> ApiResponse<Vec<PhotoPreview>> {
        session.navigate(Page::Photos);
        let response = self.read_active_site(session, |_, site| {
            paths(site, section)
                .iter()
                .map(|path| preview(path))
                .collect::<Vec<_>>()
        });

        let unreadable = response
            .data
            .as_ref()
            .map(|previews| {
                previews
                    .iter()
                    .filter(|p| matches!(p, PhotoPreview::RawPath { .. }))
                    .count()
            })
            .unwrap_or(0);
        if unreadable > 0 {
            response.with_notice(Notice::warning(format!(
                "{} photo(s) could not be displayed",
                unreadable
            )))
        } else {
            response
        }
    }
}
