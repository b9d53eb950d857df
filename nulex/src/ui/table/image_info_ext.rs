use comfy_table::{Cell, ContentArrangement};

use crate::project::ImageInfo;

pub trait ImageInfoListExt {
    fn render_table(&self) -> String;
}

impl ImageInfoListExt for [ImageInfo] {
    fn render_table(&self) -> String {
        let rows = self
            .iter()
            .map(|info| {
                [
                    Cell::new(&info.kind),
                    Cell::new(&info.owner),
                    Cell::new(info.image.to_string()),
                    Cell::new(info.image.registry().unwrap_or("-")),
                    Cell::new(if info.image.is_internal() { "yes" } else { "no" }),
                ]
            })
            .collect::<Vec<_>>();

        comfy_table::Table::new()
            .load_preset(comfy_table::presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["KIND", "NAME", "IMAGE", "REGISTRY", "INTERNAL"])
            .add_rows(rows)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::ImageInfoListExt as _;
    use crate::project::ImageInfo;

    #[test]
    fn test_render_table_lists_every_image() {
        let images = vec![
            ImageInfo {
                kind: "ReplicationController".to_string(),
                owner: "frontend".to_string(),
                image: "172.30.163.241:5000/demo/web:v1".parse().expect("Should parse"),
                relocated: None,
            },
            ImageInfo {
                kind: "Pod".to_string(),
                owner: "worker".to_string(),
                image: "busybox".parse().expect("Should parse"),
                relocated: None,
            },
        ];

        let table = images.render_table();
        assert!(table.contains("172.30.163.241:5000/demo/web:v1"));
        assert!(table.contains("frontend"));
        assert!(table.contains("worker"));
        assert!(table.contains("INTERNAL"));
    }
}
