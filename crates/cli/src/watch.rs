use crate::render;
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsStr;
use std::path::Path;
use tagmark_core::reconciler::Reconciler;
use tracing::warn;

/// True for create/modify/remove events touching a file named `file_name`.
pub fn touches(event: &Event, file_name: &OsStr) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name))
}

/// Re-flattens whenever the bookmarks file changes on disk and prints a summary.
pub async fn watch_file(rec: &mut Reconciler, path: &Path) -> Result<()> {
    let file_name = path
        .file_name()
        .context("bookmarks path has no file name")?
        .to_os_string();
    // Browsers replace the file by rename, so watch its directory.
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;

    println!("Watching {}: {}", path.display(), render::summary_line(rec.view()));
    let mut last = render::summary_line(rec.view());
    while let Some(event) = rx.recv().await {
        match event {
            Ok(ev) if touches(&ev, &file_name) => {
                if rec.reload().await.is_err() {
                    continue;
                }
                let summary = render::summary_line(rec.view());
                if summary != last {
                    println!("{summary}");
                    last = summary;
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "watch error"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, ModifyKind};

    #[test]
    fn only_changes_to_the_bookmarks_file_count() {
        let name = OsStr::new("Bookmarks");
        let modify = Event::new(EventKind::Modify(ModifyKind::Any)).add_path("/p/Bookmarks".into());
        assert!(touches(&modify, name));
        let other = Event::new(EventKind::Modify(ModifyKind::Any)).add_path("/p/History".into());
        assert!(!touches(&other, name));
        let access = Event::new(EventKind::Access(AccessKind::Any)).add_path("/p/Bookmarks".into());
        assert!(!touches(&access, name));
    }
}
