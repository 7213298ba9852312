/// Admin application: settings screen and the Review Details panel.
use crate::components::admin_header::{AdminHeader, GettingStarted};
use crate::components::docs_panel::DocsVisibility;
use crate::components::review_details::ReviewDetailsPanel;
use crate::components::settings_page::SettingsPage;
use leptos::*;
use leptos_meta::*;
use leptos_router::*;

#[component]
pub fn AdminApp() -> impl IntoView {
    provide_meta_context();
    // shared by the header button and every docs sidebar
    provide_context(DocsVisibility::new());

    view! {
        <Title text="Product Review Manager" />
        <Router>
            <AdminHeader />
            <main class="prm-admin">
                <Routes>
                    <Route path="/admin" view=GettingStarted />
                    <Route path="/admin/settings" view=SettingsPage />
                    <Route path="/admin/reviews/:id" view=ReviewDetailsPanel />
                </Routes>
            </main>
        </Router>
    }
}
