/// Settings screen: one text input per declared setting, a save button and the
/// documentation sidebar.
use crate::components::docs_panel::{DocsPanel, DocsVisibility};
use crate::models::settings::{Settings, SETTINGS_SCHEMA};
use crate::server_fns::{load_settings, save_settings};
use leptos::*;

/// Label of the save button.
pub fn save_label(pending: bool, dirty: bool) -> &'static str {
    if pending {
        "Saving"
    } else if dirty {
        "Save settings"
    } else {
        "Saved"
    }
}

#[component]
pub fn SettingsPage() -> impl IntoView {
    let settings = create_resource(|| (), |_| async move { load_settings().await });
    let docs = use_context::<DocsVisibility>();
    let docs_hidden = move || docs.map(|docs| docs.hidden.get()).unwrap_or(false);

    view! {
        <section class="prm-settings">
            <h2>{ "Settings" }</h2>
            <div class="prm-settings-body">
                <Suspense fallback=move || view! { <p>{ "Loading settings..." }</p> }>
                    {move || settings.get().map(|result| match result {
                        Ok(initial) => view! { <SettingsForm initial=initial /> }.into_view(),
                        Err(err) => view! {
                            <p class="prm-error">{ format!("Could not load settings: {err}") }</p>
                        }
                        .into_view(),
                    })}
                </Suspense>
                <Show when=move || !docs_hidden()>
                    <DocsPanel />
                </Show>
            </div>
        </section>
    }
}

#[component]
fn SettingsForm(initial: Settings) -> impl IntoView {
    let draft = create_rw_signal(initial);
    let (dirty, set_dirty) = create_signal(false);
    let (error, set_error) = create_signal(None::<String>);

    let save = create_action(|settings: &Settings| {
        let settings = settings.clone();
        async move { save_settings(settings).await }
    });

    create_effect(move |_| {
        if let Some(result) = save.value().get() {
            match result {
                Ok(saved) => {
                    draft.set(saved);
                    set_dirty.set(false);
                    set_error.set(None);
                }
                Err(err) => set_error.set(Some(err.to_string())),
            }
        }
    });

    let fields = SETTINGS_SCHEMA
        .iter()
        .map(|property| {
            let key = property.key;
            view! {
                <div class="prm-settings-row">
                    <label for=key>{property.label}</label>
                    <input
                        id=key
                        type="text"
                        placeholder=property.placeholder
                        prop:value=move || draft.with(|settings| settings.get(key).to_string())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            draft.update(|settings| settings.set(key, value));
                            set_dirty.set(true);
                        }
                    />
                </div>
            }
        })
        .collect_view();

    view! {
        <form on:submit=move |ev| {
            ev.prevent_default();
            save.dispatch(draft.get());
        }>
            {fields}
            <footer class="prm-settings-footer">
                <button
                    type="submit"
                    disabled=move || save.pending().get() || !dirty.get()
                >
                    {move || save_label(save.pending().get(), dirty.get())}
                </button>
                {move || error.get().map(|err| view! { <p class="prm-error">{err}</p> })}
            </footer>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_button_states() {
        assert_eq!(save_label(true, true), "Saving");
        assert_eq!(save_label(false, true), "Save settings");
        assert_eq!(save_label(false, false), "Saved");
    }
}
