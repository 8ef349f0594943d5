mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use crud_rust::{
    CrudEndpoint, CrudError, CrudService, ErrorInfo, FilterCriteria, FilterableFields,
    InMemoryRepository, Lookup, OperationCheck, Persist, PageRequest, PageResult, Resource,
    ResourceMapper, Sort, Transactional,
};
use support::{
    author_service, book_repository, book_request, book_service, seed_books, Author, Book,
    BookEndpoint, BookMapper,
};

#[test]
fn create_get_delete_round_trip() {
    let endpoint: BookEndpoint = CrudEndpoint::new(book_service(), BookMapper);

    let request = book_request("Dune");
    let created = endpoint.create(request.clone()).unwrap();
    let expected = BookMapper.to_dto(&Book {
        id: Some(created.id),
        ..BookMapper.to_entity(request)
    });
    assert_eq!(endpoint.get(&created.id).unwrap(), expected);

    endpoint.delete(&created.id).unwrap();
    let err = endpoint.get(&created.id).unwrap_err();
    assert_eq!(err, CrudError::not_found("Book", created.id));
    assert_eq!(err.to_string(), format!("Book (ID: {}) not found", created.id));
}

#[test]
fn search_is_ignored_without_criteria() {
    let service = author_service();
    service.create(Author::new("John", "Doe")).unwrap();
    service.create(Author::new("Jane", "Roe")).unwrap();

    let everything = service.list(None).unwrap();
    assert_eq!(service.list(Some("john")).unwrap(), everything);
    assert_eq!(service.list(Some("no such author")).unwrap(), everything);
}

#[test]
fn update_of_missing_id_never_checks_or_saves() {
    let checks = Arc::new(AtomicUsize::new(0));
    let seen = checks.clone();
    let service = book_service().editable(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        OperationCheck::permitted()
    });

    let err = service.update(&42, Book::new("Ghost", "0")).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(checks.load(Ordering::SeqCst), 0);
    assert!(service.repository().is_empty().unwrap());
}

#[test]
fn denied_update_keeps_stored_resource() {
    let service = book_service().editable(|book| {
        if book.published {
            OperationCheck::denied_with("Published books are read-only")
        } else {
            OperationCheck::permitted()
        }
    });
    let original = service.create(Book::new("Dune", "1")).unwrap();

    let mut change = original.clone();
    change.published = true;
    let err = service.update(&1, change).unwrap_err();
    assert_eq!(err.to_string(), "Published books are read-only");
    assert_eq!(err.status_code(), 409);
    assert_eq!(service.get(&1).unwrap(), original);
}

#[test]
fn denied_delete_never_removes() {
    let service = book_service().deletable(|_| {
        OperationCheck::denied_for(ErrorInfo::conflict("Book has open loans"))
    });
    let book = service.create(Book::new("Dune", "1")).unwrap();

    let err = service.delete(&1).unwrap_err();
    match &err {
        CrudError::Conflict { message, detail } => {
            assert_eq!(message, "Book has open loans");
            assert!(detail.is_some());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(service.get(&1).unwrap(), book);
}

#[test]
fn concurrent_deletes_check_once() {
    let checks = Arc::new(AtomicUsize::new(0));
    let seen = checks.clone();
    let service = Arc::new(book_service().deletable(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        OperationCheck::permitted()
    }));
    service.create(Book::new("Dune", "1")).unwrap();

    let barrier = Arc::new(Barrier::new(4));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = service.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                service.delete(&1)
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(CrudError::is_not_found));
    assert_eq!(checks.load(Ordering::SeqCst), 1);
}

#[test]
fn rollback_never_erases_a_concurrent_update() {
    let repository = book_repository();
    let service = CrudService::new(repository.clone());
    let saved = Arc::new(Barrier::new(2));

    let creator = {
        let repository = repository.clone();
        let saved = saved.clone();
        thread::spawn(move || {
            repository.transaction(None, || {
                let book = repository.save(Book::new("Draft", "0"))?;
                saved.wait();
                thread::sleep(Duration::from_millis(50));
                Err::<Book, _>(CrudError::conflict(format!(
                    "abandoned {}",
                    book.id.unwrap_or_default()
                )))
            })
        })
    };

    saved.wait();
    let updated = service.update(&1, Book::new("Final", "1"));
    assert!(creator.join().unwrap().unwrap_err().is_conflict());

    // The update waited for the rollback and found nothing to change.
    assert!(updated.unwrap_err().is_not_found());
    assert!(repository.find_by_id(&1).unwrap().is_none());
}

#[test]
fn get_by_ids_omits_missing() {
    let service = book_service();
    seed_books(service.repository(), 3);

    let found = service.get_by_ids(&[3, 7, 1]).unwrap();
    let ids: Vec<_> = found.iter().filter_map(|b| b.id).collect();
    assert_eq!(ids, vec![3, 1]);
}

#[test]
fn page_of_twenty_five() {
    let endpoint: BookEndpoint = CrudEndpoint::new(book_service(), BookMapper);
    seed_books(endpoint.service().repository(), 25);

    let result: PageResult<_> = endpoint
        .page(&PageRequest::new(0, 10).unwrap(), None)
        .unwrap();
    assert_eq!(result.content.len(), 10);
    assert_eq!(result.current_page, 1);
    assert_eq!(result.total_pages, 3);
    assert_eq!(result.total_elements, 25);
    assert!(!result.last);

    let last = endpoint
        .page(&PageRequest::new(2, 10).unwrap(), None)
        .unwrap();
    assert_eq!(last.content.len(), 5);
    assert!(last.last);
}

#[test]
fn page_filters_then_sorts() {
    let service = book_service()
        .filter(FilterCriteria::like(FilterableFields::single("title")))
        .unwrap();
    seed_books(service.repository(), 12);

    // "Book 1", "Book 10", "Book 11", "Book 12"
    let request = PageRequest::new(0, 3).unwrap().with_sort(Sort::desc("id"));
    let page = service.page(&request, Some("book 1")).unwrap();
    let ids: Vec<_> = page.content().iter().filter_map(|b| b.id).collect();
    assert_eq!(ids, vec![12, 11, 10]);
    assert_eq!(page.total_elements(), 4);
    assert_eq!(page.total_pages(), 2);
}

#[test]
fn before_create_failure_saves_nothing() {
    let service = book_service().before_create(|book| {
        if book.isbn.is_none() {
            return Err(CrudError::invalid_argument("isbn is required"));
        }
        Ok(())
    });

    let mut book = Book::new("Dune", "1");
    book.isbn = None;
    assert!(matches!(
        service.create(book),
        Err(CrudError::InvalidArgument(_))
    ));
    assert!(service.repository().is_empty().unwrap());
}

#[test]
fn repository_without_generator_rejects_unset_ids() {
    let service = CrudService::new(InMemoryRepository::<Book>::new());
    let err = service.create(Book::new("Dune", "1")).unwrap_err();
    assert_eq!(err.status_code(), 500);

    let mut book = Book::new("Dune", "1");
    book.set_id(10);
    assert_eq!(service.create(book).unwrap().id, Some(10));
}

#[test]
fn transaction_spans_service_calls() {
    let repository = book_repository();
    let service = CrudService::new(repository.clone());
    seed_books(&repository, 1);

    let result: Result<(), CrudError> = repository.transaction(None, || {
        service.create(Book::new("Second", "2"))?;
        service.delete(&1)?;
        Err(CrudError::conflict("abort"))
    });

    assert!(result.is_err());
    assert!(repository.exists_by_id(&1).unwrap());
    assert!(!repository.exists_by_id(&2).unwrap());
    assert_eq!(repository.len().unwrap(), 1);
    assert!(repository.save(Book::new("Third", "3")).is_ok());
}
