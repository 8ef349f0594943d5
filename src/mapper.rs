//! Conversions between request payloads, resources and response DTOs.
//!
//! Mappers are pure: no repository access, no side effects.

use crate::resource::Resource;

/// Mapper for a top-level resource.
pub trait ResourceMapper<E: Resource, Req, Dto>: Send + Sync {
    fn to_dto(&self, entity: &E) -> Dto;

    fn to_entity(&self, request: Req) -> E;

    /// Resource for a full replacement of `id`. Defaults to mapping the
    /// request and stamping the id on it.
    fn update_entity(&self, id: &E::Id, request: Req) -> E {
        let mut entity = self.to_entity(request);
        entity.set_id(id.clone());
        entity
    }
}

/// Mapper for a resource that lives under a parent.
pub trait NestedResourceMapper<E: Resource, Req, Dto, ParentId>: Send + Sync {
    fn to_dto(&self, entity: &E) -> Dto;

    /// Build the child, linking it to `parent_id`.
    fn to_entity(&self, parent_id: &ParentId, request: Req) -> E;

    fn update_entity(&self, id: &E::Id, parent_id: &ParentId, request: Req) -> E {
        let mut entity = self.to_entity(parent_id, request);
        entity.set_id(id.clone());
        entity
    }
}

/// Mapper for a child whose identifier is composed from the parent id and a
/// child-local token.
pub trait CompositeKeyResourceMapper<E: Resource, Req, Dto, ParentId, Token>: Send + Sync {
    fn to_dto(&self, entity: &E) -> Dto;

    /// Build the child; the mapper fills in the composite id itself.
    fn to_entity(&self, parent_id: &ParentId, request: Req) -> E;

    fn update_entity(&self, parent_id: &ParentId, request: Req) -> E {
        self.to_entity(parent_id, request)
    }

    /// Compose the full identifier. Must be injective over
    /// `(parent_id, token)`.
    fn composite_id(&self, parent_id: &ParentId, token: &Token) -> E::Id;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Note {
        id: Option<u32>,
        text: String,
    }

    impl Resource for Note {
        type Id = u32;
        const RESOURCE_TYPE: &'static str = "Note";

        fn id(&self) -> Option<&u32> {
            self.id.as_ref()
        }

        fn set_id(&mut self, id: u32) {
            self.id = Some(id);
        }
    }

    struct NoteMapper;

    impl ResourceMapper<Note, String, String> for NoteMapper {
        fn to_dto(&self, entity: &Note) -> String {
            entity.text.clone()
        }

        fn to_entity(&self, request: String) -> Note {
            Note {
                id: None,
                text: request,
            }
        }
    }

    #[test]
    fn update_entity_stamps_id() {
        let note = NoteMapper.update_entity(&7, "hello".into());
        assert_eq!(
            note,
            Note {
                id: Some(7),
                text: "hello".into()
            }
        );
    }
}
