use anyhow::{Context, Result, bail};
use log::info;

/// The projection is pushed to the vertex shader as a push constant.
pub const REQUIRED_ADAPTER_FEATURES: wgpu::Features = wgpu::Features::PUSH_CONSTANTS;

#[derive(Debug, Clone)]
pub struct RenderDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub alpha_mode: wgpu::CompositeAlphaMode,
}

impl RenderDevice {
    pub async fn for_surface(
        instance: wgpu::Instance,
        surface: &wgpu::Surface<'static>,
    ) -> Result<Self> {
        let adapter = get_adapter(&instance, Some(surface)).await?;

        info!("GPU Adapter backend: {:?}", adapter.get_info().backend);
        let surface_caps = surface.get_capabilities(&adapter);
        // Colors are specified in linear rgb space.
        let Some(surface_format) = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
        else {
            bail!("Surface is not compatible with the GPU adapter");
        };
        info!("- Surface format: {surface_format:?}");

        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        info!("- Selected alpha mode: {alpha_mode:?}");

        let (device, queue) = get_device_and_queue_from_adapter(adapter).await?;

        info!(
            "- Max texture dimension: {}",
            device.limits().max_texture_dimension_2d
        );

        Ok(Self {
            device,
            queue,
            surface_format,
            alpha_mode,
        })
    }

    /// A device without a surface, rendering into textures only.
    pub async fn headless(surface_format: wgpu::TextureFormat) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = get_adapter(&instance, None).await?;
        info!(
            "Headless GPU Adapter: {} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        let (device, queue) = get_device_and_queue_from_adapter(adapter).await?;

        Ok(Self {
            device,
            queue,
            surface_format,
            alpha_mode: wgpu::CompositeAlphaMode::Opaque,
        })
    }
}

async fn get_device_and_queue_from_adapter(
    adapter: wgpu::Adapter,
) -> Result<(wgpu::Device, wgpu::Queue)> {
    adapter
        .request_device(&wgpu::DeviceDescriptor {
            required_features: REQUIRED_ADAPTER_FEATURES,
            required_limits: adapter.limits(),
            label: None,
            memory_hints: Default::default(),
            trace: Default::default(),
        })
        .await
        .context("Requesting device")
}

async fn get_adapter(
    instance: &wgpu::Instance,
    surface: Option<&wgpu::Surface<'static>>,
) -> Result<wgpu::Adapter> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::None,
            // Be sure the adapter can present the surface.
            compatible_surface: surface,
            force_fallback_adapter: false,
        })
        .await
        .context("GPU Adapter not found")?;

    if !adapter.features().contains(REQUIRED_ADAPTER_FEATURES) {
        bail!("GPU Adapter must support {:?}", REQUIRED_ADAPTER_FEATURES);
    }

    Ok(adapter)
}
