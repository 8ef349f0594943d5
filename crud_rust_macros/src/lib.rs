mod fields;
mod patchable;
mod resource;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Resource)]
// ============================================================================

/// Derive macro for the `Resource` trait.
///
/// The identifier is the field marked `#[resource(id)]`, or the field named `id`.
/// It must be an `Option<_>`: unset until the resource is persisted.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Resource)]
/// #[resource(name = "Book")]
/// struct Book {
///     id: Option<u64>,
///     title: String,
/// }
/// ```
///
/// Without `name`, the resource type is the struct name.
#[proc_macro_derive(Resource, attributes(resource))]
pub fn derive_resource(input: TokenStream) -> TokenStream {
    resource::derive_resource(input)
}

// ============================================================================
// #[derive(FieldAccess)]
// ============================================================================

/// Derive macro for the `FieldAccess` trait: a typed getter/setter table keyed
/// by field name, used by filters (read) and the patch engine (write).
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, FieldAccess)]
/// #[field(rename_all = "camelCase")]
/// struct Author {
///     id: Option<u64>,
///     first_name: Option<String>,     // "firstName"
///     #[field(rename = "surname")]
///     last_name: Option<String>,
///     #[field(skip)]
///     cache: Vec<u8>,
/// }
/// ```
///
/// Every table field must implement `Serialize`, `DeserializeOwned` and `Default`
/// (clearing a field resets it to `Default::default()`).
#[proc_macro_derive(FieldAccess, attributes(field))]
pub fn derive_field_access(input: TokenStream) -> TokenStream {
    fields::derive_field_access(input)
}

// ============================================================================
// #[derive(Patchable)]
// ============================================================================

/// Derive macro for the `Patchable` trait: collects the fields marked
/// `#[patchable]` into the PATCH allowlist of a request type.
///
/// ```ignore
/// #[derive(Deserialize, Patchable)]
/// struct BookRequest {
///     #[patchable]
///     title: String,
///     #[patchable(rename = "pageCount")]
///     page_count: u32,
///     isbn: String, // never patchable
/// }
/// ```
///
/// A request type with no marked fields gets an empty allowlist, which makes
/// PATCH unsupported for that resource.
#[proc_macro_derive(Patchable, attributes(patchable))]
pub fn derive_patchable(input: TokenStream) -> TokenStream {
    patchable::derive_patchable(input)
}
