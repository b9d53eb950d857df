mod image_info_ext;

pub use self::image_info_ext::ImageInfoListExt;
