//! Site views and their templates.
//!
//! The route table maps paths to [`View`]s; the page handler loads whatever
//! data a view needs and asks [`Pages`] to render it. Templates live in
//! `templates/pages`, are compiled into the binary, and are parsed once at
//! startup. Tera autoescapes every `.html` template, so only URLs built by
//! [`booking`] are marked `safe`.

use serde::Serialize;
use tera::{Context, Tera};
use uuid::Uuid;

use super::router::RouteTable;
use crate::services::booking;
use crate::services::catalog::CatalogEntry;
use crate::services::product::{CATEGORIES, Product, is_product_category};
use crate::services::review::{MAX_RATING, MIN_RATING, Review};

pub const HOME_PATH: &str = "/";
pub const PRODUCTS_PATH: &str = "/products";
pub const LOGIN_PATH: &str = "/admin/login";
pub const DASHBOARD_PATH: &str = "/admin";

const SITE_NAME: &str = "Little Kings & Queens";

const TEMPLATES: [(&str, &str); 7] = [
    ("layout.html", include_str!("../../templates/pages/layout.html")),
    ("home.html", include_str!("../../templates/pages/home.html")),
    ("product.html", include_str!("../../templates/pages/product.html")),
    ("login.html", include_str!("../../templates/pages/login.html")),
    ("dashboard.html", include_str!("../../templates/pages/dashboard.html")),
    ("loading.html", include_str!("../../templates/pages/loading.html")),
    ("not_found.html", include_str!("../../templates/pages/not_found.html")),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Product,
    AdminLogin,
    AdminDashboard,
}

/// The site's route table. The login route sits outside the guard so the
/// dashboard redirect always lands somewhere renderable.
#[must_use]
pub fn site_routes() -> RouteTable<View> {
    RouteTable::new()
        .exact(HOME_PATH, View::Home)
        .prefix(PRODUCTS_PATH, View::Product)
        .prefix(LOGIN_PATH, View::AdminLogin)
        .prefix(DASHBOARD_PATH, View::AdminDashboard)
        .guarded(LOGIN_PATH)
}

#[must_use]
pub fn product_path(id: Uuid) -> String {
    format!("{PRODUCTS_PATH}/{id}")
}

/// `/products/<uuid>` → the id. Anything deeper or malformed is `None`.
#[must_use]
pub fn product_id_from_path(path: &str) -> Option<Uuid> {
    let rest = path.strip_prefix(PRODUCTS_PATH)?.strip_prefix('/')?;
    Uuid::parse_str(rest).ok()
}

/// `KSh 12,500` or `KSh 1,250.50`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_ksh(price: f64) -> String {
    let cents = (price * 100.0).round() as i64;
    let (whole, frac) = (cents / 100, cents % 100);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if frac == 0 { format!("KSh {grouped}") } else { format!("KSh {grouped}.{frac:02}") }
}

/// `254723153712` → `+254 723 153 712`
#[must_use]
pub fn format_phone(number: &str) -> String {
    let digits: Vec<char> = number.chars().collect();
    let mut out = String::from("+");
    for (i, group) in digits.chunks(3).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.extend(group);
    }
    out
}

// =============================================================================
// PAGE INPUTS
// =============================================================================

pub struct HomePage<'a> {
    pub entries: &'a [CatalogEntry],
    pub selected_category: &'a str,
    pub error: Option<&'a str>,
}

pub struct ProductPage<'a> {
    pub entry: &'a CatalogEntry,
    pub reviews: &'a [Review],
    pub error: Option<&'a str>,
}

pub struct LoginPage<'a> {
    pub email: &'a str,
    pub code_sent: bool,
    pub error: Option<&'a str>,
}

pub struct DashboardPage<'a> {
    pub admin_email: &'a str,
    pub products: &'a [Product],
    pub error: Option<&'a str>,
}

// =============================================================================
// TEMPLATE CONTEXT
// =============================================================================

#[derive(Serialize)]
struct CategoryLink<'a> {
    name: &'a str,
    query: String,
    selected: bool,
}

#[derive(Serialize)]
struct Card<'a> {
    id: Uuid,
    name: &'a str,
    description: &'a str,
    category: &'a str,
    image_url: &'a str,
    price_label: String,
    rating_label: String,
    review_count: i64,
    like_count: i64,
    liked: bool,
    booking_url: &'a str,
}

impl<'a> Card<'a> {
    fn new(entry: &'a CatalogEntry) -> Self {
        let p = &entry.product;
        let rating_label = if entry.rating.review_count > 0 {
            format!("{:.1}", entry.rating.average_rating)
        } else {
            "No ratings".to_owned()
        };
        Self {
            id: p.id,
            name: &p.name,
            description: &p.description,
            category: &p.category,
            image_url: p.image_url.as_deref().unwrap_or_default(),
            price_label: format_ksh(p.price),
            rating_label,
            review_count: entry.rating.review_count,
            like_count: entry.likes.like_count,
            liked: entry.likes.liked,
            booking_url: &entry.booking_url,
        }
    }
}

#[derive(Serialize)]
struct ReviewItem<'a> {
    rating: i16,
    stars: String,
    review_text: Option<&'a str>,
    created_at: &'a str,
}

impl<'a> ReviewItem<'a> {
    fn new(review: &'a Review) -> Self {
        let filled = usize::try_from(review.rating.clamp(0, MAX_RATING)).unwrap_or_default();
        let empty = usize::try_from(MAX_RATING).unwrap_or_default() - filled;
        Self {
            rating: review.rating,
            stars: format!("{}{}", "★".repeat(filled), "☆".repeat(empty)),
            review_text: review.review_text.as_deref(),
            created_at: &review.created_at,
        }
    }
}

#[derive(Serialize)]
struct DashboardRow<'a> {
    id: Uuid,
    name: &'a str,
    description: &'a str,
    category: &'a str,
    image_url: &'a str,
    price_input: String,
    price_label: String,
    is_active: bool,
}

impl<'a> DashboardRow<'a> {
    fn new(p: &'a Product) -> Self {
        Self {
            id: p.id,
            name: &p.name,
            description: &p.description,
            category: &p.category,
            image_url: p.image_url.as_deref().unwrap_or_default(),
            price_input: p.price.to_string(),
            price_label: format_ksh(p.price),
            is_active: p.is_active,
        }
    }
}

// =============================================================================
// RENDERER
// =============================================================================

/// Parsed page templates plus the contact details every page footer shows.
pub struct Pages {
    tera: Tera,
    contact_number: String,
    inquiry_url: String,
}

impl Pages {
    /// # Errors
    ///
    /// Returns a Tera error if any template fails to parse.
    pub fn new(whatsapp_number: &str) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self {
            tera,
            contact_number: format_phone(whatsapp_number),
            inquiry_url: booking::inquiry_link(whatsapp_number),
        })
    }

    fn context(&self, title: &str) -> Context {
        let mut ctx = Context::new();
        ctx.insert("site_name", SITE_NAME);
        ctx.insert("title", title);
        ctx.insert("contact_number", &self.contact_number);
        ctx.insert("inquiry_url", &self.inquiry_url);
        ctx
    }

    /// # Errors
    ///
    /// Returns a Tera error if rendering fails.
    pub fn home(&self, page: &HomePage<'_>) -> Result<String, tera::Error> {
        let categories: Vec<CategoryLink<'_>> = CATEGORIES
            .iter()
            .map(|&name| CategoryLink {
                name,
                query: urlencoding::encode(name).into_owned(),
                selected: name == page.selected_category,
            })
            .collect();
        let cards: Vec<Card<'_>> = page.entries.iter().map(Card::new).collect();
        let return_to = format!("/?category={}", urlencoding::encode(page.selected_category));

        let mut ctx = self.context("Event Equipment Rentals");
        ctx.insert("categories", &categories);
        ctx.insert("cards", &cards);
        ctx.insert("return_to", &return_to);
        ctx.insert("error", &page.error);
        self.tera.render("home.html", &ctx)
    }

    /// # Errors
    ///
    /// Returns a Tera error if rendering fails.
    pub fn product(&self, page: &ProductPage<'_>) -> Result<String, tera::Error> {
        let reviews: Vec<ReviewItem<'_>> = page.reviews.iter().map(ReviewItem::new).collect();
        let rating_options: Vec<i16> = (MIN_RATING..=MAX_RATING).rev().collect();

        let mut ctx = self.context(&page.entry.product.name);
        ctx.insert("card", &Card::new(page.entry));
        ctx.insert("reviews", &reviews);
        ctx.insert("rating_options", &rating_options);
        ctx.insert("error", &page.error);
        self.tera.render("product.html", &ctx)
    }

    /// # Errors
    ///
    /// Returns a Tera error if rendering fails.
    pub fn login(&self, page: &LoginPage<'_>) -> Result<String, tera::Error> {
        let mut ctx = self.context("Admin Login");
        ctx.insert("email", page.email);
        ctx.insert("code_sent", &page.code_sent);
        ctx.insert("error", &page.error);
        self.tera.render("login.html", &ctx)
    }

    /// # Errors
    ///
    /// Returns a Tera error if rendering fails.
    pub fn dashboard(&self, page: &DashboardPage<'_>) -> Result<String, tera::Error> {
        let products: Vec<DashboardRow<'_>> = page.products.iter().map(DashboardRow::new).collect();
        let product_categories: Vec<&str> = CATEGORIES
            .iter()
            .copied()
            .filter(|c| is_product_category(c))
            .collect();

        let mut ctx = self.context("Admin Dashboard");
        ctx.insert("admin_email", page.admin_email);
        ctx.insert("products", &products);
        ctx.insert("product_categories", &product_categories);
        ctx.insert("error", &page.error);
        self.tera.render("dashboard.html", &ctx)
    }

    /// # Errors
    ///
    /// Returns a Tera error if rendering fails.
    pub fn loading(&self) -> Result<String, tera::Error> {
        self.tera.render("loading.html", &self.context("Loading"))
    }

    /// # Errors
    ///
    /// Returns a Tera error if rendering fails.
    pub fn not_found(&self) -> Result<String, tera::Error> {
        self.tera.render("not_found.html", &self.context("Not Found"))
    }
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
