use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::ActiveTheme as _;
use gpui_component::list::ListItem;
use gpui_component::{Icon, IconName, Sizable as _, h_flex, v_flex};
use gpui_dnd_list::{DndListItem, DndListRowState, DndListState, dnd_list};

const TASKS: [&str; 8] = [
    "Draft release notes",
    "Review open pull requests",
    "Triage new issues",
    "Update changelog",
    "Archived: old roadmap",
    "Tag the release",
    "Publish crates",
    "Announce on the forum",
];

pub struct DndListExample {
    list: Entity<DndListState<usize>>,
}

impl DndListExample {
    pub fn view(_window: &mut Window, cx: &mut App) -> Entity<Self> {
        let list = cx.new(|cx| {
            DndListState::new(cx)
                .items(tasks())
                .can_drop(|_, _, modifiers| !modifiers.alt)
                .on_reorder(|reorder, _| {
                    tracing::info!(
                        item = %reorder.item_id,
                        from = reorder.from,
                        to = reorder.to,
                        "task moved"
                    );
                })
        });
        cx.new(|cx| {
            cx.observe(&list, |_, _, cx| cx.notify()).detach();
            Self { list }
        })
    }
}

impl Render for DndListExample {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let order = self
            .list
            .read(cx)
            .items_ref()
            .iter()
            .map(|item| (item.data + 1).to_string())
            .collect::<Vec<_>>()
            .join(" · ");

        v_flex()
            .size_full()
            .p(px(16.))
            .gap_y_3()
            .child(div().text_xl().font_weight(FontWeight::BOLD).child("Tasks"))
            .child(div().text_sm().text_color(theme.muted_foreground).child(
                "拖动左侧手柄调整顺序；按住 Alt 松开可放弃本次移动；归档项不可拖拽。",
            ))
            .child(
                div()
                    .w(px(420.))
                    .flex_1()
                    .min_h(px(0.))
                    .rounded(px(12.))
                    .border_1()
                    .border_color(theme.border)
                    .child(dnd_list(&self.list, |ix, item, row_state, _window, cx| {
                        render_task(ix, item, row_state, cx)
                    })),
            )
            .child(
                div()
                    .text_xs()
                    .text_color(theme.muted_foreground)
                    .child(format!("原始编号：{order}")),
            )
    }
}

fn render_task(
    ix: usize,
    item: &DndListItem<usize>,
    row_state: DndListRowState,
    cx: &mut App,
) -> ListItem {
    let muted = cx.theme().muted_foreground;

    ListItem::new(ix)
        .when(row_state.displaced, |this| this.bg(cx.theme().muted))
        .when(item.is_disabled(), |this| this.opacity(0.5))
        .child(
            h_flex()
                .gap_x_2()
                .items_center()
                .child(Icon::from(IconName::Menu).small().text_color(muted))
                .child(item.label.clone()),
        )
}

fn tasks() -> Vec<DndListItem<usize>> {
    TASKS
        .iter()
        .enumerate()
        .map(|(ix, label)| {
            let archived = label.starts_with("Archived");
            DndListItem::new(format!("task-{ix}"), *label, ix).disabled(archived)
        })
        .collect()
}
