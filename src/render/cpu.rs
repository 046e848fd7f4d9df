use std::{collections::HashMap, sync::Arc};

use vello_cpu::kurbo::Shape as _;

use crate::{
    assets::decode::PreparedImage,
    assets::frame::FrameGraphic,
    foundation::core::{Affine, Canvas, Rect},
    foundation::error::{FrameError, FrameResult},
    render::backend::{Compositor, RenderJob, RenderSettings, RenderedFrame},
    transform::sample::{compute_sample_rect, visible_mapping},
};

const CLIP_TOLERANCE: f64 = 0.1;

/// CPU compositor backed by `vello_cpu`.
///
/// Everything is drawn in design space (the frame artwork's coordinates) under
/// a single design-to-output scale, so a preview and an export of the same
/// state differ only in resolution.
pub struct CpuCompositor {
    settings: RenderSettings,
    frame: FrameGraphic,
    frame_cache: HashMap<Canvas, vello_cpu::Image>,
    image_cache: Option<(Arc<Vec<u8>>, vello_cpu::Image)>,
}

impl CpuCompositor {
    pub fn new(settings: RenderSettings, frame: FrameGraphic) -> Self {
        Self {
            settings,
            frame,
            frame_cache: HashMap::new(),
            image_cache: None,
        }
    }

    /// Compositor with default layout and the bundled frame artwork.
    pub fn with_builtin_frame() -> FrameResult<Self> {
        Ok(Self::new(RenderSettings::default(), FrameGraphic::builtin()?))
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    fn image_paint_for(&mut self, img: &PreparedImage) -> FrameResult<vello_cpu::Image> {
        if let Some((key, paint)) = &self.image_cache
            && Arc::ptr_eq(key, &img.rgba8_premul)
        {
            return Ok(paint.clone());
        }

        let pixmap =
            image_premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache = Some((img.rgba8_premul.clone(), paint.clone()));
        Ok(paint)
    }

    fn frame_paint_for(&mut self, output: Canvas) -> FrameResult<vello_cpu::Image> {
        if let Some(paint) = self.frame_cache.get(&output) {
            return Ok(paint.clone());
        }

        let rgba8_premul = self.frame.rasterize(output)?;
        let pixmap = image_premul_bytes_to_pixmap(&rgba8_premul, output.width, output.height)
            .map_err(|e| FrameError::frame_load(e.to_string()))?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        tracing::debug!(
            width = output.width,
            height = output.height,
            "rasterized frame graphic"
        );
        self.frame_cache.insert(output, paint.clone());
        Ok(paint)
    }
}

impl Compositor for CpuCompositor {
    #[tracing::instrument(
        skip(self, job),
        fields(width = job.output.width, height = job.output.height, zoom = job.view.zoom)
    )]
    fn render(&mut self, job: &RenderJob<'_>) -> FrameResult<RenderedFrame> {
        let out_w: u16 = job
            .output
            .width
            .try_into()
            .map_err(|_| FrameError::render("output width exceeds u16"))?;
        let out_h: u16 = job
            .output
            .height
            .try_into()
            .map_err(|_| FrameError::render("output height exceeds u16"))?;

        // Decode both inputs before touching any pixels.
        let photo = self.image_paint_for(job.image)?;
        let frame = self.frame_paint_for(job.output)?;

        let settings = self.settings;
        let scale = job.output.scale_from(settings.design);
        let design_to_output = Affine::scale_non_uniform(scale.x, scale.y);

        let mut ctx = vello_cpu::RenderContext::new(out_w, out_h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        ctx.set_transform(affine_to_cpu(design_to_output));
        let bg = settings.background;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(settings.design.width),
            f64::from(settings.design.height),
        ));

        let circle = settings.circle;
        let clip = vello_cpu::kurbo::Circle::new(
            (circle.center.x, circle.center.y),
            circle.radius,
        )
        .to_path(CLIP_TOLERANCE);
        ctx.push_clip_layer(&clip);

        let (img_w, img_h) = (f64::from(job.image.width), f64::from(job.image.height));
        let sample = compute_sample_rect(img_w, img_h, job.bbox, job.view, circle.dest_size());
        match visible_mapping(sample, img_w, img_h, circle.dest_rect()) {
            Some(mapping) => {
                ctx.set_transform(affine_to_cpu(design_to_output * mapping.transform));
                ctx.set_paint(photo);
                ctx.fill_rect(&rect_to_cpu(mapping.source));
            }
            None => tracing::debug!(?sample, "sample rect misses the image; circle left empty"),
        }
        ctx.pop_layer();

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(frame);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(out_w),
            f64::from(out_h),
        ));

        let mut pixmap = vello_cpu::Pixmap::new(out_w, out_h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(RenderedFrame {
            width: job.output.width,
            height: job.output.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> FrameResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FrameError::image_decode(format!("image width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FrameError::image_decode(format!("image height {height} exceeds u16")))?;
    if w == 0 || h == 0 {
        return Err(FrameError::image_decode("image has zero width or height"));
    }
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(FrameError::image_decode("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
