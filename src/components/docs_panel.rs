use leptos::*;

/// Whether the documentation sidebars are hidden on the admin pages.
#[derive(Debug, Clone, Copy)]
pub struct DocsVisibility {
    pub hidden: RwSignal<bool>,
}

impl DocsVisibility {
    pub fn new() -> Self {
        DocsVisibility {
            hidden: create_rw_signal(false),
        }
    }

    pub fn show_all(&self) {
        self.hidden.set(false);
    }

    pub fn toggle(&self) {
        self.hidden.update(|hidden| *hidden = !*hidden);
    }
}

const FAQ: &[(&str, &str, bool)] = &[
    ("FAQ Query 1?", "FAQ Answer 1", true),
    ("FAQ Query 2?", "FAQ Answer 2", false),
];

#[component]
pub fn DocsPanel() -> impl IntoView {
    let docs = use_context::<DocsVisibility>();

    view! {
        <aside class="prm-docs">
            <header class="prm-docs-header">
                <h3>{ "Documentation" }</h3>
                <button
                    type="button"
                    on:click=move |_| {
                        if let Some(docs) = docs {
                            docs.toggle();
                        }
                    }
                >
                    { "Hide" }
                </button>
            </header>
            {FAQ
                .iter()
                .map(|(question, answer, open)| view! {
                    <details open=*open>
                        <summary>{*question}</summary>
                        <p>{*answer}</p>
                    </details>
                })
                .collect_view()}
        </aside>
    }
}
