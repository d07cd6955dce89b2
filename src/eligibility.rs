use crate::{frame::Frame, settings::Settings, thumbnail_errors::ThumbnailError};

/// Decide whether a thumbnail can be generated for `frame`.
///
/// Pure check on the frame metadata, run before any download.
///
/// Arguments
/// ---------
/// * `frame`: the frame descriptor returned by the archive
/// * `color_requested`: whether the caller asked for a color composition
/// * `settings`: eligible configuration types and raw image extensions
///
/// Return
/// ------
/// * `Ok(())`, or a [`ThumbnailError::Validation`] (400) carrying the reason
pub fn can_generate_thumbnail_on(
    frame: &Frame,
    color_requested: bool,
    settings: &Settings,
) -> Result<(), ThumbnailError> {
    let (Some(configuration_type), Some(filename)) = (&frame.configuration_type, &frame.filename)
    else {
        return Err(ThumbnailError::validation(
            "Cannot generate thumbnail for given frame",
        ));
    };
    let configuration_type = configuration_type.to_uppercase();

    if !settings
        .valid_configuration_types
        .contains(&configuration_type)
    {
        return Err(ThumbnailError::validation(format!(
            "Cannot generate thumbnail for configuration_type={configuration_type}"
        )));
    }

    if color_requested && frame.request_id.is_none() {
        return Err(ThumbnailError::validation(
            "Cannot generate color thumbnail for a frame that does not have a request",
        ));
    }

    if color_requested
        && !settings
            .color_configuration_types
            .contains(&configuration_type)
    {
        return Err(ThumbnailError::validation(format!(
            "Cannot generate color thumbnail for configuration_type={configuration_type}"
        )));
    }

    if !settings
        .raw_image_extensions
        .iter()
        .any(|extension| filename.ends_with(extension.as_str()))
    {
        return Err(ThumbnailError::validation(
            "Cannot generate thumbnail for non FITS-type frame",
        ));
    }

    Ok(())
}
