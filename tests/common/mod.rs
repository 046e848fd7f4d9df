#![allow(dead_code)]

use std::{cell::RefCell, collections::VecDeque, io::Cursor};

use gameframe::{AiGateway, BoundingBox, EnhancedImage, FrameError, FrameResult};

/// Gateway that answers from queues filled by the test.
#[derive(Default)]
pub struct ScriptedGateway {
    pub detections: RefCell<VecDeque<FrameResult<Option<BoundingBox>>>>,
    pub enhancements: RefCell<VecDeque<FrameResult<EnhancedImage>>>,
    pub detect_calls: RefCell<usize>,
}

impl ScriptedGateway {
    pub fn with_face(bbox: BoundingBox) -> Self {
        let gateway = Self::default();
        gateway.detections.borrow_mut().push_back(Ok(Some(bbox)));
        gateway
    }

    pub fn push_enhanced(&self, bytes: Vec<u8>) {
        self.enhancements.borrow_mut().push_back(Ok(EnhancedImage {
            bytes,
            mime_type: "image/png".to_string(),
        }));
    }
}

impl AiGateway for ScriptedGateway {
    async fn detect_face(&self, _image: &[u8], _mime: &str) -> FrameResult<Option<BoundingBox>> {
        *self.detect_calls.borrow_mut() += 1;
        self.detections
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(None))
    }

    async fn enhance(
        &self,
        _image: &[u8],
        _mime: &str,
        _instruction: &str,
    ) -> FrameResult<EnhancedImage> {
        self.enhancements
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(FrameError::enhancement("no scripted answer")))
    }
}

fn encode(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    encode(image::RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
}

/// Left half red, right half blue.
pub fn split_png(width: u32, height: u32) -> Vec<u8> {
    encode(image::RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            image::Rgba([255, 0, 0, 255])
        } else {
            image::Rgba([0, 0, 255, 255])
        }
    }))
}

pub fn is_red(px: [u8; 4]) -> bool {
    px[0] > 200 && px[1] < 40 && px[2] < 40
}

pub fn is_blue(px: [u8; 4]) -> bool {
    px[2] > 200 && px[0] < 40 && px[1] < 40
}

pub fn is_green(px: [u8; 4]) -> bool {
    px[1] > 200 && px[0] < 40 && px[2] < 40
}
