use serde::{Deserialize, Serialize};

/// An allowed license plate and whether it is currently authorized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Plate {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(default)]
    pub plate: String,
    #[serde(default)]
    pub created_at: String,
    pub status: bool,
}

/// One logged attempt to pass the gate, with the captured frame and the
/// processed result image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessAttempt {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(default)]
    pub plate: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub original_image: String,
    #[serde(default)]
    pub result_image: String,
}

impl AccessAttempt {
    /// The recognized plate text, if the backend found any.
    pub fn plate_text(&self) -> Option<&str> {
        self.plate.as_deref().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct StatusUpdate {
    pub status: bool,
}

#[derive(Debug, Serialize)]
pub struct NewPlate<'a> {
    pub plate: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ServerStatus {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_plate() {
        let plates: Vec<Plate> = serde_json::from_value(json!([
            {"ID": 3, "CreatedAt": "02/01/2024 15:04:05", "Plate": "ABC1D23", "Status": true},
            {"ID": 4, "CreatedAt": "03/01/2024 08:00:00", "Plate": "XYZ9876", "Status": false}
        ]))
        .unwrap();
        assert_eq!(plates.len(), 2);
        assert_eq!(plates[0].id, 3);
        assert_eq!(plates[0].plate, "ABC1D23");
        assert_eq!(plates[0].created_at, "02/01/2024 15:04:05");
        assert!(plates[0].status);
        assert!(!plates[1].status);
    }

    #[test]
    fn access_attempt_without_plate() {
        let attempt: AccessAttempt = serde_json::from_value(json!({
            "ID": 9,
            "CreatedAt": "02/01/2024 15:04:05",
            "Plate": "",
            "OriginalImage": "original_x.jpg",
            "ResultImage": "",
            "Status": false,
            "Extra": 1
        }))
        .unwrap();
        assert_eq!(attempt.plate_text(), None);
        assert_eq!(attempt.original_image, "original_x.jpg");

        let attempt: AccessAttempt =
            serde_json::from_value(json!({"ID": 10, "Plate": null})).unwrap();
        assert_eq!(attempt.plate_text(), None);
        assert!(!attempt.status);
    }

    #[test]
    fn request_bodies_use_lowercase_keys() {
        assert_eq!(
            serde_json::to_value(StatusUpdate { status: true }).unwrap(),
            json!({"status": true})
        );
        assert_eq!(
            serde_json::to_value(NewPlate { plate: "ABC1D23" }).unwrap(),
            json!({"plate": "ABC1D23"})
        );
    }
}
