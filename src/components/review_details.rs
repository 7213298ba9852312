use crate::fields::{MAX_RATING, MIN_RATING};
use crate::models::post::PostId;
use crate::server_fns::{load_review_details, save_review_details, ReviewDetails};
use leptos::*;
use leptos_router::use_params_map;

pub fn star_label(rating: u64) -> String {
    format!("{rating} Star{}", if rating > 1 { "s" } else { "" })
}

/// "Review Details" panel for one review, saved through the field table.
#[component]
pub fn ReviewDetailsPanel() -> impl IntoView {
    let params = use_params_map();
    let review_id = move || {
        params.with(|params| params.get("id").and_then(|id| id.parse::<PostId>().ok()))
    };

    let details = create_resource(review_id, |id| async move {
        match id {
            Some(id) => load_review_details(id).await.map(Some),
            None => Ok(None),
        }
    });

    view! {
        <section class="prm-review-details">
            <h2>{ "Review Details" }</h2>
            <Suspense fallback=move || view! { <p>{ "Loading review..." }</p> }>
                {move || details.get().map(|result| match result {
                    Ok(Some(details)) => view! { <ReviewDetailsForm details=details /> }.into_view(),
                    Ok(None) => view! { <p class="prm-error">{ "Invalid review ID." }</p> }.into_view(),
                    Err(err) => view! { <p class="prm-error">{ err.to_string() }</p> }.into_view(),
                })}
            </Suspense>
        </section>
    }
}

#[component]
fn ReviewDetailsForm(details: ReviewDetails) -> impl IntoView {
    let ReviewDetails {
        id,
        title,
        product_id,
        rating,
        reviewer_name,
        products,
    } = details;
    let (product, set_product) = create_signal(product_id);
    let (stars, set_stars) = create_signal(rating);
    let (reviewer, set_reviewer) = create_signal(reviewer_name);

    let save = create_action(move |_: &()| async move {
        save_review_details(id, product.get_untracked(), stars.get_untracked(), reviewer.get_untracked())
            .await
    });

    let product_field = if products.is_empty() {
        view! { <p class="prm-no-products">{ "No products found" }</p> }.into_view()
    } else {
        view! {
            <select
                id="prm_product_name"
                class="prm-select-field"
                on:change=move |ev| set_product.set(event_target_value(&ev).parse().unwrap_or(0))
            >
                <option value="" selected=move || product.get() == 0>{ "Select a Product" }</option>
                {products
                    .into_iter()
                    .map(|option| {
                        let value = option.id as u64;
                        view! {
                            <option value=value.to_string() selected=move || product.get() == value>
                                {option.title}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
        }
        .into_view()
    };

    view! {
        <h3>{title}</h3>
        <div class="prm-meta-box-container">
            <div class="prm-meta-box-field">
                <label for="prm_product_name">{ "Product Name" }</label>
                {product_field}
            </div>
            <div class="prm-meta-box-field">
                <label for="prm_rating">{ "Rating (1-5)" }</label>
                <select
                    id="prm_rating"
                    class="prm-select-field"
                    on:change=move |ev| set_stars.set(event_target_value(&ev).parse().unwrap_or(0))
                >
                    <option value="" selected=move || stars.get() == 0>{ "Select Rating" }</option>
                    {(MIN_RATING..=MAX_RATING)
                        .map(|value| view! {
                            <option value=value.to_string() selected=move || stars.get() == value>
                                {star_label(value)}
                            </option>
                        })
                        .collect_view()}
                </select>
            </div>
            <div class="prm-meta-box-field">
                <label for="prm_reviewer_name">{ "Reviewer's Name" }</label>
                <input
                    id="prm_reviewer_name"
                    type="text"
                    class="prm-text-field"
                    prop:value=reviewer
                    on:input=move |ev| set_reviewer.set(event_target_value(&ev))
                />
            </div>
            <button type="button" disabled=move || save.pending().get() on:click=move |_| save.dispatch(())>
                {move || if save.pending().get() { "Saving" } else { "Update" }}
            </button>
            {move || save.value().get().map(|result| match result {
                Ok(()) => view! { <p class="prm-notice">{ "Saved" }</p> }.into_view(),
                Err(err) => view! { <p class="prm-error">{ err.to_string() }</p> }.into_view(),
            })}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_labels_pluralize() {
        assert_eq!(star_label(1), "1 Star");
        assert_eq!(star_label(4), "4 Stars");
    }
}
