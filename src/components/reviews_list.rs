/// Embeddable review listing: one card per displayable review, the aggregate rating
/// microdata and the pagination links.
use crate::reviews::{
    page_href, pagination_links, render_star_rating, PageLink, ReviewCard, ReviewListing,
};
use leptos::*;

#[component]
pub fn ReviewsList(listing: ReviewListing) -> impl IntoView {
    let body = if listing.has_posts {
        let ReviewListing {
            cards,
            average_rating,
            review_count,
            current_page,
            total_pages,
            ..
        } = listing;
        view! {
            {cards
                .into_iter()
                .map(|card| view! { <ReviewCardView card=card /> })
                .collect_view()}
            <meta itemprop="ratingValue" content=average_rating.to_string() />
            <meta itemprop="reviewCount" content=review_count.to_string() />
            {(total_pages > 1).then(|| view! { <Pagination total=total_pages current=current_page /> })}
        }
        .into_view()
    } else {
        view! { <p>{ "No product reviews found." }</p> }.into_view()
    };

    view! {
        <div class="prm-reviews" itemscope=true itemtype="http://schema.org/AggregateRating">
            {body}
        </div>
    }
}

#[component]
fn ReviewCardView(card: ReviewCard) -> impl IntoView {
    let product = card.product.map(|product| {
        view! {
            <p>
                <strong>{ "Product:" }</strong>
                " "
                <a href=product.url itemprop="itemReviewed" itemscope=true itemtype="http://schema.org/Product">
                    {product.title}
                </a>
            </p>
        }
    });

    view! {
        <div class="prm-review" itemscope=true itemtype="http://schema.org/Review">
            <meta itemprop="author" content=card.reviewer_name.clone() />
            <h3 itemprop="name">{card.title}</h3>
            {product}
            <p itemprop="reviewRating" itemscope=true itemtype="http://schema.org/Rating">
                <meta itemprop="ratingValue" content=card.rating.to_string() />
                <strong>{ "Rating:" }</strong>
                " "
                {render_star_rating(i64::from(card.rating))}
            </p>
            <div itemprop="description" inner_html=card.content></div>
            <p>
                <strong>{ "Reviewer:" }</strong>
                " "
                {card.reviewer_name}
            </p>
        </div>
    }
}

#[component]
pub fn Pagination(total: u32, current: u32) -> impl IntoView {
    let links = pagination_links(total, current)
        .into_iter()
        .map(|link| match link {
            PageLink::Prev(page) => view! {
                <a class="prev page-numbers" href=page_href(page)>{ "« Previous" }</a>
            }
            .into_view(),
            PageLink::Page(page) => view! {
                <a class="page-numbers" href=page_href(page)>{page}</a>
            }
            .into_view(),
            PageLink::Current(page) => view! {
                <span aria-current="page" class="page-numbers current">{page}</span>
            }
            .into_view(),
            PageLink::Dots => view! { <span class="page-numbers dots">{ "…" }</span> }.into_view(),
            PageLink::Next(page) => view! {
                <a class="next page-numbers" href=page_href(page)>{ "Next »" }</a>
            }
            .into_view(),
        })
        .collect_view();

    view! { <div class="prm-pagination">{links}</div> }
}

/// Server-side rendering of the listing outside the router.
#[cfg(feature = "ssr")]
pub fn render_listing_html(listing: ReviewListing) -> String {
    leptos::ssr::render_to_string(move || view! { <ReviewsList listing=listing /> }).to_string()
}
