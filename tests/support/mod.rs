//! Test domain: authors, books, reviews (nested) and chapters (composite ids).
#![allow(dead_code)]

use crud_rust::{
    CompositeKeyResourceMapper, CrudEndpoint, CrudService, FieldAccess, InMemoryRepository,
    NestedCrudService, NestedResourceMapper, Patchable, Persist, Resource, ResourceMapper,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Authors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Resource, FieldAccess)]
pub struct Author {
    pub id: Option<u64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl Author {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            id: None,
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            email: None,
        }
    }
}

/// No `#[patchable]` fields: PATCH is not supported for authors.
#[derive(Debug, Clone, Serialize, Deserialize, Patchable)]
pub struct AuthorRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorDto {
    pub id: u64,
    pub full_name: String,
}

pub struct AuthorMapper;

impl ResourceMapper<Author, AuthorRequest, AuthorDto> for AuthorMapper {
    fn to_dto(&self, author: &Author) -> AuthorDto {
        AuthorDto {
            id: author.id.unwrap_or_default(),
            full_name: format!(
                "{} {}",
                author.first_name.as_deref().unwrap_or_default(),
                author.last_name.as_deref().unwrap_or_default()
            )
            .trim()
            .to_string(),
        }
    }

    fn to_entity(&self, request: AuthorRequest) -> Author {
        Author {
            id: None,
            first_name: Some(request.first_name),
            last_name: Some(request.last_name),
            email: request.email,
        }
    }
}

pub type AuthorService = CrudService<Author, InMemoryRepository<Author>>;

pub fn author_service() -> AuthorService {
    CrudService::new(InMemoryRepository::new().with_sequential_ids())
}

// ============================================================================
// Books
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Resource, FieldAccess)]
#[resource(name = "Book")]
pub struct Book {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub pages: u32,
    pub published: bool,
    #[field(skip)]
    pub review_count: u32,
}

impl Book {
    pub fn new(title: &str, isbn: &str) -> Self {
        Self {
            id: None,
            title: Some(title.to_string()),
            isbn: Some(isbn.to_string()),
            pages: 100,
            published: false,
            review_count: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Patchable)]
pub struct BookRequest {
    #[patchable]
    pub title: Option<String>,
    pub isbn: Option<String>,
    #[patchable]
    pub pages: u32,
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDto {
    pub id: u64,
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub pages: u32,
    pub published: bool,
}

pub struct BookMapper;

impl ResourceMapper<Book, BookRequest, BookDto> for BookMapper {
    fn to_dto(&self, book: &Book) -> BookDto {
        BookDto {
            id: book.id.unwrap_or_default(),
            title: book.title.clone(),
            isbn: book.isbn.clone(),
            pages: book.pages,
            published: book.published,
        }
    }

    fn to_entity(&self, request: BookRequest) -> Book {
        Book {
            id: None,
            title: request.title,
            isbn: request.isbn,
            pages: request.pages,
            published: request.published,
            review_count: 0,
        }
    }
}

pub fn book_request(title: &str) -> BookRequest {
    BookRequest {
        title: Some(title.to_string()),
        isbn: Some(format!("isbn-{title}")),
        pages: 120,
        published: false,
    }
}

pub type BookRepository = InMemoryRepository<Book>;
pub type BookService = CrudService<Book, BookRepository>;
pub type BookEndpoint = CrudEndpoint<Book, BookRepository, BookMapper, BookRequest, BookDto>;

pub fn book_repository() -> BookRepository {
    InMemoryRepository::new().with_sequential_ids()
}

pub fn book_service() -> BookService {
    CrudService::new(book_repository())
}

/// Saves `count` books titled "Book 1", "Book 2", ...
pub fn seed_books(repository: &BookRepository, count: usize) -> Vec<Book> {
    (1..=count)
        .map(|n| {
            repository
                .save(Book::new(&format!("Book {n}"), &format!("isbn-{n}")))
                .unwrap()
        })
        .collect()
}

// ============================================================================
// Reviews (nested under books, own ids)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Resource, FieldAccess)]
pub struct Review {
    pub id: Option<u64>,
    pub book_id: u64,
    pub rating: u8,
    pub body: Option<String>,
    pub author_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Patchable)]
pub struct ReviewRequest {
    #[patchable]
    pub rating: u8,
    #[patchable]
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDto {
    pub id: u64,
    pub book_id: u64,
    pub rating: u8,
    pub body: Option<String>,
}

pub struct ReviewMapper;

impl NestedResourceMapper<Review, ReviewRequest, ReviewDto, u64> for ReviewMapper {
    fn to_dto(&self, review: &Review) -> ReviewDto {
        ReviewDto {
            id: review.id.unwrap_or_default(),
            book_id: review.book_id,
            rating: review.rating,
            body: review.body.clone(),
        }
    }

    fn to_entity(&self, book_id: &u64, request: ReviewRequest) -> Review {
        Review {
            id: None,
            book_id: *book_id,
            rating: request.rating,
            body: request.body,
            author_email: None,
        }
    }
}

pub fn review(book_id: u64, rating: u8) -> Review {
    Review {
        id: None,
        book_id,
        rating,
        body: Some(format!("{rating} stars")),
        author_email: None,
    }
}

pub type ReviewService =
    NestedCrudService<Book, Review, InMemoryRepository<Review>, BookRepository>;

pub fn review_service(books: BookRepository) -> ReviewService {
    NestedCrudService::new(
        InMemoryRepository::new().with_sequential_ids(),
        books,
        "book_id",
    )
    .unwrap()
}

// ============================================================================
// Chapters (nested under books, composite "book-number" ids)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Resource, FieldAccess)]
pub struct Chapter {
    pub id: Option<String>,
    pub book_id: u64,
    pub number: u32,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterRequest {
    pub number: u32,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterDto {
    pub id: String,
    pub number: u32,
    pub title: Option<String>,
}

pub struct ChapterMapper;

impl CompositeKeyResourceMapper<Chapter, ChapterRequest, ChapterDto, u64, u32> for ChapterMapper {
    fn to_dto(&self, chapter: &Chapter) -> ChapterDto {
        ChapterDto {
            id: chapter.id.clone().unwrap_or_default(),
            number: chapter.number,
            title: chapter.title.clone(),
        }
    }

    fn to_entity(&self, book_id: &u64, request: ChapterRequest) -> Chapter {
        Chapter {
            id: Some(self.composite_id(book_id, &request.number)),
            book_id: *book_id,
            number: request.number,
            title: request.title,
        }
    }

    fn composite_id(&self, book_id: &u64, number: &u32) -> String {
        format!("{book_id}-{number}")
    }
}

pub type ChapterService =
    NestedCrudService<Book, Chapter, InMemoryRepository<Chapter>, BookRepository>;

pub fn chapter_service(books: BookRepository) -> ChapterService {
    NestedCrudService::new(InMemoryRepository::new(), books, "book_id").unwrap()
}
