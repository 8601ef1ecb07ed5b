//! Interactive session: one line per user action, same loop as the browser page.

use crate::render;
use anyhow::Result;
use std::io::Write;
use tagmark_core::picker::{PickerContext, TagPopover};
use tagmark_core::reconciler::{Outcome, Reconciler};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const HELP: &str = "\
commands:
  list                  show the filtered bookmarks
  tags                  show tags with counts
  search <text>         filter by text (empty clears)
  esc                   clear the search
  tag <name> | all      filter by tag, or show everything
  delete <id>           delete (undo stays available for a few seconds)
  undo                  restore the last deleted bookmark
  edit <id> [filter]    open the tag picker for a bookmark
  pick <n>              choose row n in the open picker
  done                  close the picker
  assign <id> <tag>     toggle a tag
  create <id> <name>    new tag for a bookmark
  reload                re-read the bookmark tree
  quit";

/// Picker shown as a numbered list on the terminal.
#[derive(Debug, Default)]
pub struct TerminalPopover {
    anchor: Option<String>,
    context: Option<PickerContext>,
}

impl TerminalPopover {
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    pub fn context(&self) -> Option<&PickerContext> {
        self.context.as_ref()
    }
}

impl TagPopover for TerminalPopover {
    fn open(&mut self, anchor: &str, context: PickerContext) {
        self.anchor = Some(anchor.to_string());
        self.context = Some(context);
    }

    fn close(&mut self) {
        self.anchor = None;
        self.context = None;
    }
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Applied => "ok".to_string(),
        Outcome::Conflict(detail) => format!("ok ({detail})"),
        Outcome::Noop => "nothing to do".to_string(),
    }
}

pub async fn run_shell<R, W>(rec: &mut Reconciler, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut popover = TerminalPopover::default();
    writeln!(out, "{}", render::list(rec.view()))?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (cmd, rest) = line
            .split_once(' ')
            .map(|(c, r)| (c, r.trim()))
            .unwrap_or((line, ""));

        let result = match cmd {
            "quit" | "exit" => break,
            "help" => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            "list" | "ls" => {
                writeln!(out, "{}", render::list(rec.view()))?;
                continue;
            }
            "tags" => {
                writeln!(out, "{}", render::sidebar(rec.view()))?;
                continue;
            }
            "search" => {
                rec.view_mut().set_query(rest);
                writeln!(out, "{}", render::list(rec.view()))?;
                continue;
            }
            "esc" => {
                rec.view_mut().clear_query();
                writeln!(out, "{}", render::list(rec.view()))?;
                continue;
            }
            "tag" => {
                rec.view_mut().select_tag(Some(rest.to_string()));
                writeln!(out, "{}", render::list(rec.view()))?;
                continue;
            }
            "all" => {
                rec.view_mut().select_tag(None);
                writeln!(out, "{}", render::list(rec.view()))?;
                continue;
            }
            "delete" | "rm" => {
                let res = rec.delete_bookmark(rest).await;
                if res.is_ok() {
                    writeln!(
                        out,
                        "Bookmark deleted. `undo` within {}s",
                        rec.undo_window().as_secs()
                    )?;
                }
                res
            }
            "undo" => rec.undo_delete().await,
            "edit" => {
                let (id, filter) = rest.split_once(' ').unwrap_or((rest, ""));
                match rec.view().find(id) {
                    Some(bookmark) => {
                        let ctx = PickerContext::build(rec.view().tags(), bookmark, filter.trim());
                        popover.open(id, ctx);
                        if let Some(ctx) = popover.context() {
                            writeln!(out, "{}", render::picker(ctx))?;
                        }
                    }
                    None => writeln!(out, "error: unknown bookmark: {id}")?,
                }
                continue;
            }
            "pick" => {
                let choice = rest
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|n| popover.context().and_then(|ctx| ctx.choice_at(n)));
                let (Some(anchor), Some(choice)) = (popover.anchor().map(str::to_string), choice)
                else {
                    writeln!(out, "error: no such picker row")?;
                    continue;
                };
                popover.close();
                rec.apply_choice(&anchor, choice).await
            }
            "done" => {
                popover.close();
                continue;
            }
            "assign" => match rest.split_once(' ') {
                Some((id, tag)) => rec.assign_tag(id, tag.trim()).await,
                None => {
                    writeln!(out, "usage: assign <id> <tag>")?;
                    continue;
                }
            },
            "create" => match rest.split_once(' ') {
                Some((id, name)) => rec.create_tag(id, name).await,
                None => {
                    writeln!(out, "usage: create <id> <name>")?;
                    continue;
                }
            },
            "reload" => rec.reload().await.map(|_| Outcome::Applied),
            other => {
                writeln!(out, "unknown command: {other} (try `help`)")?;
                continue;
            }
        };

        match result {
            Ok(outcome) => writeln!(out, "{}", describe(&outcome))?,
            Err(err) => writeln!(out, "error: {err}")?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popover_open_and_close() {
        let mut popover = TerminalPopover::default();
        let bookmark = tagmark_core::models::BookmarkRecord {
            id: "5".into(),
            title: "T".into(),
            url: "https://t.example".into(),
            date_added: 0,
            parent_id: "1".into(),
            tags: vec![],
            favicon: String::new(),
        };
        popover.open("5", PickerContext::build(&["Work".to_string()], &bookmark, ""));
        assert_eq!(popover.anchor(), Some("5"));
        assert_eq!(popover.context().unwrap().entries.len(), 1);
        popover.close();
        assert!(popover.context().is_none());
    }
}
