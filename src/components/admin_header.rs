use crate::components::docs_panel::DocsVisibility;
use leptos::*;
use leptos_router::A;

#[component]
pub fn AdminHeader() -> impl IntoView {
    let docs = use_context::<DocsVisibility>();

    view! {
        <header class="prm-admin-header">
            <strong class="prm-logo">{ "Product Review Manager" }</strong>
            <nav>
                <A href="/admin" exact=true>{ "Getting started" }</A>
                <A href="/admin/settings">{ "Settings" }</A>
            </nav>
            <button
                type="button"
                on:click=move |_| {
                    if let Some(docs) = docs {
                        docs.show_all();
                    }
                }
            >
                { "Show all hidden informations, notices and documentations" }
            </button>
        </header>
    }
}

#[component]
pub fn GettingStarted() -> impl IntoView {
    view! {
        <section class="prm-getting-started">
            <h2>{ "Getting started" }</h2>
            <p>{ "Reviews are listed at /product-reviews, five per page." }</p>
            <p>{ "Open a review at /admin/reviews/<id> to set its product, rating and reviewer." }</p>
        </section>
    }
}
