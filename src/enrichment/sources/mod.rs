//! Concrete enrichment sources.

mod google_books;
mod openlibrary;
mod ratings;

pub use google_books::{parse_volumes, GoogleBooksSource, GOOGLE_BOOKS_BASE_URL};
pub use openlibrary::{parse_books, OpenLibrarySource, OPENLIBRARY_BASE_URL};
pub use ratings::{simulated_ratings, RatingsSource};
