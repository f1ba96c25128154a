//! Request DTO to entity conversions.

use crate::models::{Anime, AnimePostRequestBody, AnimePutRequestBody};

impl From<AnimePostRequestBody> for Anime {
    /// The id is left at zero; the store assigns the real one on insert.
    fn from(body: AnimePostRequestBody) -> Self {
        Anime {
            id: 0,
            name: body.name,
        }
    }
}

impl From<AnimePutRequestBody> for Anime {
    fn from(body: AnimePutRequestBody) -> Self {
        Anime {
            id: body.id.unwrap_or_default(),
            name: body.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_body_maps_name_without_id() {
        let anime = Anime::from(AnimePostRequestBody {
            name: "Anime 1".to_string(),
        });
        assert_eq!(anime.id, 0);
        assert_eq!(anime.name, "Anime 1");
    }

    #[test]
    fn put_body_carries_its_id() {
        let anime = Anime::from(AnimePutRequestBody {
            id: Some(7),
            name: "Anime 3".to_string(),
        });
        assert_eq!(anime, Anime { id: 7, name: "Anime 3".to_string() });
    }
}
