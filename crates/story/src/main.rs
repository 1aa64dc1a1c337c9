use gpui::*;
use gpui_component::Root;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use gpui_dnd_list_story::dnd_list::DndListExample;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gpui_dnd_core=debug,gpui_dnd_list=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() {
    init_tracing();

    Application::new().run(|cx| {
        gpui_component::init(cx);
        cx.activate(true);

        let options = WindowOptions {
            titlebar: Some(TitlebarOptions {
                title: Some("DnD List".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        cx.spawn(async move |cx| {
            cx.open_window(options, |window, cx| {
                let view = DndListExample::view(window, cx);
                cx.new(|cx| Root::new(view, window, cx))
            })?;
            anyhow::Ok(())
        })
        .detach();
    });
}
