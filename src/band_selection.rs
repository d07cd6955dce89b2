use crate::{
    constants::{BLUE_FILTERS, RED_FILTERS, VISUAL_FILTERS},
    frame::Frame,
    thumbnail_errors::ThumbnailError,
};

/// Color channel of a composed thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Red,
    Visual,
    Blue,
}

impl Band {
    /// Channel order of a color composition.
    pub const ORDER: [Band; 3] = [Band::Red, Band::Visual, Band::Blue];

    /// Optical elements accepted for this band.
    pub fn filters(&self) -> &'static [&'static str] {
        match self {
            Band::Red => RED_FILTERS,
            Band::Visual => VISUAL_FILTERS,
            Band::Blue => BLUE_FILTERS,
        }
    }

    fn matches(&self, frame: &Frame) -> bool {
        frame
            .primary_optical_element
            .as_deref()
            .is_some_and(|element| self.filters().contains(&element))
    }
}

/// Pick one frame per band out of the sibling frames of an observation request.
///
/// For every band the first frame, in listing order, whose optical element is one of the band
/// aliases is selected.
///
/// Arguments
/// ---------
/// * `frames`: the sibling frames of one request
///
/// Return
/// ------
/// * The frames in `[red, visual, blue]` order, or [`ThumbnailError::BandsNotFound`] as soon as
///   one band has no candidate
pub fn rvb_frames(frames: &[Frame]) -> Result<[&Frame; 3], ThumbnailError> {
    let selected = Band::ORDER.map(|band| frames.iter().find(|frame| band.matches(frame)));
    match selected {
        [Some(red), Some(visual), Some(blue)] => Ok([red, visual, blue]),
        _ => Err(ThumbnailError::BandsNotFound),
    }
}

#[cfg(test)]
mod band_selection_test {
    use super::*;

    fn frame(id: u64, element: &str) -> Frame {
        Frame {
            id,
            request_id: Some(99),
            filename: Some(format!("frame-{id}.fits.fz")),
            url: None,
            configuration_type: Some("EXPOSE".into()),
            primary_optical_element: Some(element.into()),
            proposal_id: None,
        }
    }

    #[test]
    fn test_output_is_always_red_visual_blue() {
        let frames = vec![frame(1, "B"), frame(2, "V"), frame(3, "rp")];
        let ids = rvb_frames(&frames).unwrap().map(|f| f.id);
        assert_eq!(ids, [3, 2, 1]);

        let frames = vec![frame(4, "V"), frame(5, "R"), frame(6, "B")];
        let ids = rvb_frames(&frames).unwrap().map(|f| f.id);
        assert_eq!(ids, [5, 4, 6]);
    }

    #[test]
    fn test_selection_follows_band_order() {
        let frames = vec![frame(1, "B"), frame(2, "R"), frame(3, "V")];
        let selected = rvb_frames(&frames).unwrap();
        for (band, frame) in Band::ORDER.iter().zip(selected) {
            assert!(band.matches(frame));
        }
        assert_eq!(Band::ORDER, [Band::Red, Band::Visual, Band::Blue]);
    }

    #[test]
    fn test_first_match_wins() {
        let frames = vec![
            frame(1, "gp"),
            frame(2, "R"),
            frame(3, "rp"),
            frame(4, "V"),
            frame(5, "B"),
            frame(6, "B"),
        ];
        let ids = rvb_frames(&frames).unwrap().map(|f| f.id);
        assert_eq!(ids, [2, 4, 5]);
    }

    #[test]
    fn test_missing_blue_band_fails() {
        let frames = vec![frame(1, "rp"), frame(2, "V"), frame(3, "gp")];
        let err = rvb_frames(&frames).unwrap_err();
        assert_eq!(err, ThumbnailError::BandsNotFound);
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_untagged_frames_never_match() {
        let mut untagged = frame(1, "V");
        untagged.primary_optical_element = None;
        assert!(rvb_frames(&[untagged]).is_err());
        assert!(rvb_frames(&[]).is_err());
    }

    #[test]
    fn test_aliases_are_case_sensitive() {
        let frames = vec![frame(1, "r"), frame(2, "V"), frame(3, "B")];
        assert!(rvb_frames(&frames).is_err());
    }
}
